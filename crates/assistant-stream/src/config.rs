use std::time::Duration;

use crate::errors::ClientError;
use crate::liveness::LivenessConfig;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Configuration of the chat client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin; API paths are resolved against it.
    pub base_url: String,
    /// Timeout for plain request/response calls (not the push stream).
    pub request_timeout: Duration,
    /// Connect and heartbeat timers of streaming sessions.
    pub liveness: LivenessConfig,
    /// Bounded buffer between the transport pump and the chat-input task.
    pub event_buffer_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            liveness: LivenessConfig::default(),
            event_buffer_capacity: 128,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Builds a config from the environment:
    /// - `ASSISTANT_BASE_URL` (default `http://127.0.0.1:5000`)
    /// - `ASSISTANT_REQUEST_TIMEOUT_SECS`
    /// - `ASSISTANT_CONNECT_TIMEOUT_SECS`
    /// - `ASSISTANT_HEARTBEAT_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("ASSISTANT_BASE_URL")
            && !url.trim().is_empty()
        {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = read_secs("ASSISTANT_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = secs;
        }
        if let Some(secs) = read_secs("ASSISTANT_CONNECT_TIMEOUT_SECS")? {
            config.liveness.connect_timeout = secs;
        }
        if let Some(secs) = read_secs("ASSISTANT_HEARTBEAT_TIMEOUT_SECS")? {
            config.liveness.heartbeat_timeout = secs;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.liveness.connect_timeout = timeout;
        self
    }

    pub fn heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.liveness.heartbeat_timeout = timeout;
        self
    }

    pub fn event_buffer_capacity(mut self, capacity: usize) -> Self {
        self.event_buffer_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::Config(
                "request_timeout must be greater than 0".into(),
            ));
        }
        if self.liveness.connect_timeout.is_zero() || self.liveness.heartbeat_timeout.is_zero() {
            return Err(ClientError::Config(
                "stream timeouts must be greater than 0".into(),
            ));
        }
        if self.event_buffer_capacity == 0 {
            return Err(ClientError::Config(
                "event_buffer_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn read_secs(key: &str) -> Result<Option<Duration>, ClientError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|e| ClientError::Config(format!("{key} must be a whole number of seconds: {e}")))
}
