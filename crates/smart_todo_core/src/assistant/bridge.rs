use crate::assistant::directive::extract_directive;
use crate::assistant::prompt::system_instruction;
use crate::assistant::transport::{CompletionRequest, CompletionResponse, CompletionTransport};
use crate::config::AssistantConfig;
use crate::error::AppError;
use crate::model::{ConversationLog, ConversationMessage, Task};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// What the UI shows for one assistant turn, plus any tasks it asked to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub display_text: String,
    pub extracted_tasks: Vec<String>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct AssistantBridge<T> {
    transport: T,
    config: AssistantConfig,
    in_flight: AtomicBool,
}

impl<T: CompletionTransport> AssistantBridge<T> {
    pub fn new(transport: T, config: AssistantConfig) -> Self {
        Self {
            transport,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn build_request(&self, conversation: &ConversationLog, tasks: &[Task]) -> CompletionRequest {
        let history = conversation.recent(self.config.history_limit);
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ConversationMessage::system(system_instruction(tasks)));
        messages.extend_from_slice(history);

        CompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Runs one assistant turn. A single attempt is made; a second call while
    /// one is outstanding is rejected without touching the network.
    pub async fn converse(
        &self,
        conversation: &ConversationLog,
        tasks: &[Task],
        credential: Option<&SecretString>,
    ) -> Result<AssistantReply, AppError> {
        let credential = credential
            .filter(|secret| !secret.expose_secret().trim().is_empty())
            .ok_or_else(|| AppError::auth("api key is not set"))?;

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let request = self.build_request(conversation, tasks);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self.transport.send(&request, credential).await?;
        let raw = reply_text(response)?;
        Ok(interpret_reply(&raw))
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AppError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::invalid_input("an assistant request is already in progress"))?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Turns reply text into display text and tasks. All-or-nothing: either the
/// directive parses completely or the raw text is shown and nothing is added.
pub fn interpret_reply(raw: &str) -> AssistantReply {
    match extract_directive(raw) {
        Some(directive) => {
            debug!(tasks = directive.tasks.len(), "assistant reply carries add_task directive");
            AssistantReply {
                display_text: directive.display_text(),
                extracted_tasks: directive.tasks,
            }
        }
        None => AssistantReply {
            display_text: raw.to_string(),
            extracted_tasks: Vec::new(),
        },
    }
}

fn reply_text(response: CompletionResponse) -> Result<String, AppError> {
    let status = response.status;
    match status {
        200..=299 => {
            let completion: ChatCompletion = serde_json::from_str(&response.body).map_err(|err| {
                AppError::service(Some(status), format!("unreadable completion: {err}"))
            })?;
            completion
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| AppError::service(Some(status), "completion contained no reply"))
        }
        401 | 403 => Err(AppError::auth(error_message(status, &response.body))),
        429 => Err(AppError::rate_limited(error_message(status, &response.body))),
        _ => Err(AppError::service(
            Some(status),
            error_message(status, &response.body),
        )),
    }
}

fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}
