//! Events emitted while a turn is processed.
//!
//! Front ends subscribe to these to show progress: streamed model text,
//! each tool call and its result, and the end of the turn.

use labassist_core::provider::Usage;
use serde::Serialize;

/// Events emitted by the assistant loop during one turn.
///
/// - `chunk`       partial model text; `pass` is 1 for the plan, 2 for the answer
/// - `tool_call`   a tool is about to run
/// - `tool_result` the tool finished
/// - `done`        the turn produced an answer
/// - `error`       the turn failed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    Chunk { pass: usize, content: String },

    ToolCall { name: String, argument: String },

    ToolResult {
        name: String,
        output: String,
        success: bool,
    },

    Done {
        session_id: String,
        passes: usize,
        tool_calls_made: usize,
        usage: Option<Usage>,
    },

    Error { message: String },
}

impl AgentStreamEvent {
    /// Short event name.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}
