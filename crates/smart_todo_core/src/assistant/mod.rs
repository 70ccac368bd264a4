mod bridge;
mod directive;
mod prompt;
mod transport;

pub use bridge::{AssistantBridge, AssistantReply, interpret_reply};
pub use directive::{ADD_TASK_ACTION, AssistantDirective, extract_directive};
pub use prompt::system_instruction;
pub use transport::{CompletionRequest, CompletionResponse, CompletionTransport, HttpTransport};
