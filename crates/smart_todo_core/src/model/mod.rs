mod conversation;
mod task;

pub use conversation::{ConversationLog, ConversationMessage, Role};
pub use task::{Task, TaskSummary};
