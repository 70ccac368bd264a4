use crate::model::{Task, TaskSummary};
use std::fmt::Write;

/// Situational context sent ahead of the conversation: task counts, the task
/// list, and the reply format that makes the app add tasks.
pub fn system_instruction(tasks: &[Task]) -> String {
    let summary = TaskSummary::from_tasks(tasks);
    let mut prompt = String::from(
        "You are a helpful assistant built into a to-do list app. \
         Help the user plan, prioritise and break down their tasks.\n\n",
    );

    let _ = writeln!(
        prompt,
        "Current tasks: {} total, {} completed, {} incomplete.",
        summary.total, summary.completed, summary.incomplete
    );
    if tasks.is_empty() {
        prompt.push_str("(the list is empty)\n");
    }
    for task in tasks {
        let _ = writeln!(prompt, "{} {}", task.glyph(), task.text);
    }

    prompt.push_str(
        "\nWhen the user asks you to add tasks, answer with exactly one JSON object \
         in this form and no other braces:\n\
         {\"action\":\"add_task\",\"tasks\":[\"first task\",\"second task\"],\"response\":\"short confirmation for the user\"}\n\
         For anything else, answer in plain text.",
    );
    prompt
}
