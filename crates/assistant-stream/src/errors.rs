use crate::liveness::TimeoutKind;

/// Default text shown when the backend sends an `error` event without text.
pub const DEFAULT_STREAM_ERROR: &str = "stream connection error";
/// Text shown when an inbound event cannot be decoded.
pub const MALFORMED_EVENT_MESSAGE: &str = "failed to process stream data";
/// Text shown when the transport drops mid-session.
pub const CONNECTION_LOST_MESSAGE: &str = "stream connection lost";

/// Errors returned by the public client API and by backend collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid user input (for example an empty message).
    #[error("validation error: {0}")]
    Validation(String),
    /// Establishing the push stream failed; callers fall back to a one-shot call.
    #[error("stream setup failed: {0}")]
    TransportSetup(String),
    /// Backend answered with a non-success HTTP status.
    #[error("http error ({status}): {message}")]
    Http { status: u16, message: String },
    /// Network or stream I/O failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// The chat-input task is gone (all handles dropped or it panicked).
    #[error("chat input task is not running")]
    ActorClosed,
}

impl ClientError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Terminal failure of one streaming session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum StreamFailure {
    /// The backend sent an explicit `error` event.
    #[error("stream error: {message}")]
    Protocol { message: String },
    /// The transport failed or closed before `complete`.
    #[error("stream transport failure: {message}")]
    Transport { message: String },
    /// An inbound event could not be decoded.
    #[error("malformed stream event: {message}")]
    Malformed { message: String },
    /// The user cancelled the session.
    #[error("stream cancelled")]
    Cancelled,
    /// A newer session replaced this one.
    #[error("stream superseded by a newer request")]
    Superseded,
}

impl StreamFailure {
    pub(crate) fn protocol(text: Option<String>) -> Self {
        let message = text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STREAM_ERROR.to_string());
        Self::Protocol { message }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Text surfaced to the user, or `None` when the failure is silent.
    ///
    /// Protocol errors are shown verbatim; malformed events get a generic
    /// message so raw payload fragments never reach the UI.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Protocol { message } => Some(message.clone()),
            Self::Transport { .. } => Some(CONNECTION_LOST_MESSAGE.to_string()),
            Self::Malformed { .. } => Some(MALFORMED_EVENT_MESSAGE.to_string()),
            Self::Cancelled => Some("request cancelled".to_string()),
            Self::Superseded => None,
        }
    }
}

impl TimeoutKind {
    /// Text surfaced to the user when this timer fires.
    pub fn user_message(self) -> &'static str {
        match self {
            TimeoutKind::Connect => "connection timed out",
            TimeoutKind::Heartbeat => "connection interrupted",
        }
    }
}
