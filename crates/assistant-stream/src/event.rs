use serde::{Deserialize, Serialize};

use crate::errors::StreamFailure;

/// A tool invocation announced by the assistant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name as reported by the backend. Treated as opaque text.
    pub tool: String,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

/// Task plan extracted by the backend from the assistant reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlanning {
    pub has_plan: bool,
    /// Absent on the wire when `has_plan` is false.
    #[serde(default)]
    pub plan_text: String,
}

impl TaskPlanning {
    pub fn plan(text: impl Into<String>) -> Self {
        Self {
            has_plan: true,
            plan_text: text.into(),
        }
    }
}

/// One decoded push event. Ordering is the backend's; the client never
/// reorders, it only deduplicates side-channel reveals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundStreamEvent {
    /// Explicit transport-open signal sent by the backend on connect.
    Connected,
    /// Keepalive; proves the channel is alive.
    Heartbeat,
    /// Terminal failure reported by the backend.
    Error {
        #[serde(default)]
        text: Option<String>,
    },
    /// Result of one tool execution; each one is shown.
    ToolResult { text: String },
    /// Full current snapshot of the assistant reply (not a delta).
    Assistant {
        #[serde(default)]
        text: String,
        #[serde(default)]
        tool_calls: Option<Vec<ToolCall>>,
        #[serde(default)]
        task_planning: Option<TaskPlanning>,
    },
    /// Status change for an already-revealed tool call.
    ToolStatus { tool: String, success: bool },
    /// Terminal success.
    Complete,
}

impl InboundStreamEvent {
    /// Decodes one event payload (the `data` of a single SSE frame).
    pub fn parse(data: &str) -> Result<Self, StreamFailure> {
        serde_json::from_str(data).map_err(|e| StreamFailure::malformed(e.to_string()))
    }

    /// Wire discriminant, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Heartbeat => "heartbeat",
            Self::Error { .. } => "error",
            Self::ToolResult { .. } => "tool_result",
            Self::Assistant { .. } => "assistant",
            Self::ToolStatus { .. } => "tool_status",
            Self::Complete => "complete",
        }
    }
}
