use crate::error::AppError;
use crate::model::{Task, TaskSummary};
use crate::storage::KeyValueStore;
use crate::storage::json_store;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

type Observer = Box<dyn Fn(&[Task])>;

/// Ordered task collection mirrored to a key-value store.
///
/// Every mutation rewrites the whole collection under the tasks key and then
/// notifies observers exactly once. Write failures are logged and swallowed so
/// the in-memory list stays usable; the next successful mutation rewrites the
/// full state anyway.
pub struct TaskStore<S> {
    kv: S,
    tasks: Vec<Task>,
    revision: u64,
    last_id_nanos: i128,
    observers: Vec<Observer>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Reads the persisted collection. Absent or malformed state starts empty.
    pub fn load(kv: S) -> Self {
        let tasks = match json_store::load_tasks(&kv) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "discarding unreadable task state");
                Vec::new()
            }
        };
        let last_id_nanos = tasks
            .iter()
            .filter_map(|task| task.id.strip_prefix("task-")?.parse::<i64>().ok())
            .map(i128::from)
            .max()
            .unwrap_or(0);

        Self {
            kv,
            tasks,
            revision: 0,
            last_id_nanos,
            observers: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Bumped once per mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary::from_tasks(&self.tasks)
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&[Task]) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn add(&mut self, text: &str) -> Result<Task, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("text is required"));
        }

        let task = self.new_task(trimmed, false);
        self.tasks.push(task.clone());
        self.commit();

        Ok(task)
    }

    /// Appends one assistant-provenance task per non-blank text as a single
    /// update. Blank entries are dropped.
    pub fn bulk_add<T: AsRef<str>>(&mut self, texts: &[T]) -> Vec<Task> {
        let mut added = Vec::with_capacity(texts.len());
        for text in texts {
            let trimmed = text.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            added.push(self.new_task(trimmed, true));
        }

        if added.is_empty() {
            return added;
        }

        self.tasks.extend(added.iter().cloned());
        self.commit();
        added
    }

    pub fn toggle(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        task.completed_at = if task.completed {
            Some(timestamp(OffsetDateTime::now_utc()))
        } else {
            None
        };
        let updated = task.clone();
        self.commit();

        Some(updated)
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(index);
        self.commit();

        Some(removed)
    }

    /// Empties the store. Callers are expected to have confirmed with the user.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.commit();
        removed
    }

    pub fn export_snapshot(&self) -> Result<String, AppError> {
        json_store::encode_tasks(&self.tasks)
    }

    fn new_task(&mut self, text: &str, added_by_ai: bool) -> Task {
        let now = OffsetDateTime::now_utc();
        let mut nanos = now.unix_timestamp_nanos().max(self.last_id_nanos + 1);
        // Stored ids outside the i64 range are not tracked by the counter.
        while self.get(&task_id(nanos)).is_some() {
            nanos += 1;
        }
        self.last_id_nanos = nanos;

        Task {
            id: task_id(nanos),
            text: text.to_string(),
            completed: false,
            created_at: timestamp(now),
            completed_at: None,
            added_by_ai,
        }
    }

    fn commit(&mut self) {
        self.revision += 1;
        if let Err(err) = json_store::save_tasks(&self.kv, &self.tasks) {
            warn!(error = %err, "failed to persist tasks");
        }
        debug!(revision = self.revision, count = self.tasks.len(), "task store updated");

        for observer in &self.observers {
            observer(&self.tasks);
        }
    }
}

fn task_id(nanos: i128) -> String {
    format!("task-{nanos}")
}

fn timestamp(now: OffsetDateTime) -> String {
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
