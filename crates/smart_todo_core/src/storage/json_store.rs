use crate::error::AppError;
use crate::model::Task;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const SCHEMA_VERSION: u32 = 1;
pub const TASKS_KEY: &str = "simple-todos";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    tasks: Vec<Task>,
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    let stored = StoredTasks {
        schema_version: SCHEMA_VERSION,
        tasks: tasks.to_vec(),
    };
    serde_json::to_string_pretty(&stored).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn decode_tasks(content: &str) -> Result<Vec<Task>, AppError> {
    let stored: StoredTasks =
        serde_json::from_str(content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let mut seen = HashSet::with_capacity(stored.tasks.len());
    for task in &stored.tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(AppError::invalid_data(format!(
                "duplicate task id '{}'",
                task.id
            )));
        }
    }

    Ok(stored.tasks)
}

pub fn load_tasks<S: KeyValueStore>(kv: &S) -> Result<Vec<Task>, AppError> {
    match kv.get(TASKS_KEY)? {
        Some(content) => decode_tasks(&content),
        None => Ok(Vec::new()),
    }
}

pub fn save_tasks<S: KeyValueStore>(kv: &S, tasks: &[Task]) -> Result<(), AppError> {
    let content = encode_tasks(tasks)?;
    kv.set(TASKS_KEY, &content)
}
