use crate::assistant::{AssistantBridge, CompletionTransport};
use crate::error::AppError;
use crate::model::{ConversationLog, ConversationMessage, Task, TaskSummary};
use crate::storage::{CredentialStore, KeyValueStore};
use crate::suggestions::suggest_improvements;
use crate::task_store::TaskStore;
use rand::Rng;
use secrecy::SecretString;
use tracing::{info, warn};

/// Entry point for the UI layer. Owns the task store, the conversation log,
/// the credential store and the assistant bridge.
pub struct TaskApi<S, T> {
    store: TaskStore<S>,
    conversation: ConversationLog,
    credentials: CredentialStore<S>,
    credential_override: Option<SecretString>,
    bridge: AssistantBridge<T>,
}

impl<S, T> TaskApi<S, T>
where
    S: KeyValueStore + Clone,
    T: CompletionTransport,
{
    pub fn new(kv: S, bridge: AssistantBridge<T>) -> Self {
        Self {
            store: TaskStore::load(kv.clone()),
            conversation: ConversationLog::new(),
            credentials: CredentialStore::new(kv),
            credential_override: None,
            bridge,
        }
    }

    /// Uses `credential` instead of the stored one (e.g. from the environment).
    pub fn with_credential(mut self, credential: Option<SecretString>) -> Self {
        self.credential_override = credential;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn summary(&self) -> TaskSummary {
        self.store.summary()
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn add_task(&mut self, text: &str) -> Result<Task, AppError> {
        self.store.add(text)
    }

    pub fn toggle_task(&mut self, id: &str) -> Result<Task, AppError> {
        let trimmed_id = required_id(id)?;
        self.store
            .toggle(trimmed_id)
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, AppError> {
        let trimmed_id = required_id(id)?;
        self.store
            .remove(trimmed_id)
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }

    pub fn clear_all(&mut self) -> usize {
        self.store.clear_all()
    }

    pub fn export_snapshot(&self) -> Result<String, AppError> {
        self.store.export_snapshot()
    }

    /// Adds canned improvement ideas as assistant-provenance tasks.
    pub fn generate_suggestions<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> Vec<Task> {
        let ideas = suggest_improvements(rng, count);
        self.store.bulk_add(&ideas)
    }

    pub fn set_credential(&self, credential: &SecretString) -> Result<(), AppError> {
        self.credentials.set(credential)
    }

    pub fn clear_credential(&self) -> Result<(), AppError> {
        self.credentials.clear()
    }

    pub fn has_credential(&self) -> bool {
        matches!(self.resolve_credential(), Ok(Some(_)))
    }

    /// Sends one chat turn and returns the assistant message appended to the
    /// conversation.
    ///
    /// Only a blank message is an error. Remote failures become the assistant
    /// message text, and tasks named by a directive are added in one batch.
    pub async fn send_chat_message(&mut self, text: &str) -> Result<ConversationMessage, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("message is required"));
        }

        self.conversation.push(ConversationMessage::user(trimmed));

        let outcome = match self.resolve_credential() {
            Ok(credential) => {
                self.bridge
                    .converse(
                        &self.conversation,
                        self.store.tasks(),
                        credential.as_ref(),
                    )
                    .await
            }
            Err(err) => Err(err),
        };

        let content = match outcome {
            Ok(reply) => {
                if !reply.extracted_tasks.is_empty() {
                    let added = self.store.bulk_add(&reply.extracted_tasks);
                    info!(count = added.len(), "added tasks from assistant reply");
                }
                reply.display_text
            }
            Err(err) => {
                warn!(error = %err, "assistant request failed");
                err.user_message()
            }
        };

        Ok(self
            .conversation
            .push(ConversationMessage::assistant(content))
            .clone())
    }

    fn resolve_credential(&self) -> Result<Option<SecretString>, AppError> {
        if let Some(credential) = self.credential_override.as_ref() {
            return Ok(Some(credential.clone()));
        }
        self.credentials.get()
    }
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed_id)
}
