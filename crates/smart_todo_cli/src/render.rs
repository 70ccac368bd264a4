use smart_todo_core::config::Palette;
use smart_todo_core::model::{Task, TaskSummary};
use tabled::settings::Style;
use tabled::{Table, Tabled};

const BAR_WIDTH: usize = 20;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "")]
    glyph: &'static str,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "task")]
    text: String,
    #[tabled(rename = "by")]
    source: &'static str,
    #[tabled(rename = "created")]
    created_at: String,
}

/// Task table, one line per task after the header. Assistant-added tasks use
/// the accent colour, completed tasks the muted one.
pub fn task_table(tasks: &[Task], palette: &Palette) -> String {
    if tasks.is_empty() {
        return "No tasks yet. Add one, or try `suggest` or `chat`.".to_string();
    }

    let rows = tasks.iter().map(|task| TaskRow {
        glyph: task.glyph(),
        id: task.id.clone(),
        text: task.text.replace(['\n', '\r'], " "),
        source: if task.added_by_ai { "ai" } else { "you" },
        created_at: task.created_at.clone(),
    });
    let rendered = Table::new(rows).with(Style::psql()).to_string();

    // psql style: header, separator, then one row per task.
    rendered
        .lines()
        .enumerate()
        .map(|(index, line)| match index.checked_sub(2).and_then(|row| tasks.get(row)) {
            Some(task) if task.completed => palette.mutedize(line),
            Some(task) if task.added_by_ai => palette.accentize(line),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn progress_line(summary: &TaskSummary) -> String {
    let filled = if summary.total == 0 {
        0
    } else {
        summary.completed * BAR_WIDTH / summary.total
    };
    format!(
        "[{}{}] {}/{} done ({}%)",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        summary.completed,
        summary.total,
        summary.percent_complete()
    )
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "created_at": task.created_at,
        "completed_at": task.completed_at,
        "added_by_ai": task.added_by_ai,
    })
}

pub fn tasks_json(tasks: &[Task]) -> serde_json::Value {
    serde_json::Value::Array(tasks.iter().map(task_json).collect())
}

#[cfg(test)]
mod tests {
    use super::{progress_line, task_table};
    use smart_todo_core::config::Theme;
    use smart_todo_core::model::{Task, TaskSummary};

    fn task(id: &str, completed: bool, added_by_ai: bool) -> Task {
        Task {
            id: id.to_string(),
            text: format!("text {id}"),
            completed,
            created_at: "2025-12-20T00:00:00Z".to_string(),
            completed_at: None,
            added_by_ai,
        }
    }

    #[test]
    fn table_colours_rows_by_state() {
        let tasks = vec![
            task("task-1", false, false),
            task("task-2", false, true),
            task("task-3", true, true),
        ];
        let rendered = task_table(&tasks, &Theme::Noir.palette());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("task-1") && !lines[2].contains('\x1b'));
        assert!(lines[3].starts_with("\x1b[38;5;141m") && lines[3].contains("task-2"));
        assert!(lines[4].starts_with("\x1b[38;5;244m") && lines[4].contains("task-3"));
    }

    #[test]
    fn empty_table_has_hint() {
        let rendered = task_table(&[], &Theme::Default.palette());
        assert!(rendered.starts_with("No tasks yet"));
    }

    #[test]
    fn progress_line_shows_ratio() {
        let summary = TaskSummary {
            total: 4,
            completed: 1,
            incomplete: 3,
        };

        assert_eq!(
            progress_line(&summary),
            "[#####---------------] 1/4 done (25%)"
        );
        assert_eq!(
            progress_line(&TaskSummary::default()),
            "[--------------------] 0/0 done (0%)"
        );
    }
}
