use serde::Deserialize;
use tracing::debug;

pub const ADD_TASK_ACTION: &str = "add_task";

const ACTION_MARKER: &str = "\"action\"";
const ADD_TASK_MARKER: &str = "\"add_task\"";

/// Task-creation instruction embedded in an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantDirective {
    pub tasks: Vec<String>,
    pub response: Option<String>,
}

impl AssistantDirective {
    /// Text shown to the user for this directive. Without a usable
    /// `response` it reports how many non-blank tasks will be added.
    pub fn display_text(&self) -> String {
        match self.response.as_deref().map(str::trim) {
            Some(response) if !response.is_empty() => response.to_string(),
            _ => {
                let count = self.tasks.iter().filter(|task| !task.is_empty()).count();
                format!("{count} tasks added")
            }
        }
    }
}

#[derive(Deserialize)]
struct RawDirective {
    action: String,
    tasks: Vec<String>,
    #[serde(default)]
    response: Option<String>,
}

/// Pulls an `{"action":"add_task","tasks":[...],"response":"..."}` object out
/// of free-form reply text.
///
/// This is a text heuristic, not a JSON scanner. The candidate span runs from
/// the first `{` in the reply to the last `}`, so the reply must carry at most
/// one object and it must be the outermost brace pair. Braces in the prose
/// before or after the object widen the span, the parse fails and the reply is
/// treated as plain conversation. Any mismatch returns `None`; nothing here
/// reports an error.
///
/// Task strings are trimmed but blank entries are kept.
pub fn extract_directive(raw: &str) -> Option<AssistantDirective> {
    if !raw.contains(ACTION_MARKER) || !raw.contains(ADD_TASK_MARKER) {
        return None;
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    let span = &raw[start..=end];

    let parsed: RawDirective = match serde_json::from_str(span) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(error = %err, "assistant reply carries no parseable directive");
            return None;
        }
    };

    if parsed.action != ADD_TASK_ACTION {
        return None;
    }

    Some(AssistantDirective {
        tasks: parsed
            .tasks
            .iter()
            .map(|task| task.trim().to_string())
            .collect(),
        response: parsed.response,
    })
}
