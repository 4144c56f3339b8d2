use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{TaskPlanning, ToolCall};

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One chat message as exchanged with the history endpoints.
///
/// The backend's history omits `id` and `timestamp`; both are filled in on
/// decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default = "uuid::Uuid::new_v4")]
    pub id: uuid::Uuid,
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Reply of the one-shot (non-streaming) chat call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OneShotReply {
    pub text: String,
    /// Server-rendered markup. Preferred over local rendering when present.
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    pub task_planning: Option<TaskPlanning>,
}

/// Answer to a stream-establishment request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSetup {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub stream_url: Option<String>,
}

impl StreamSetup {
    pub const PROCESSING: &'static str = "processing";

    /// Stream URL when the backend can serve this turn as a push stream.
    pub fn streaming_url(&self) -> Option<&str> {
        if self.status != Self::PROCESSING {
            return None;
        }
        self.stream_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}
