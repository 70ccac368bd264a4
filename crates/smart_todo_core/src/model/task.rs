use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub added_by_ai: bool,
}

impl Task {
    pub fn glyph(&self) -> &'static str {
        if self.completed { "✅" } else { "⬜" }
    }
}

/// Counts over a task collection, shared by the progress display and the
/// assistant's system instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            completed,
            incomplete: tasks.len() - completed,
        }
    }

    /// Whole percent of completed tasks; 0 for an empty list.
    pub fn percent_complete(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}
