use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Which liveness timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeoutKind {
    /// No inbound event arrived after the session started.
    Connect,
    /// The gap since the last inbound event exceeded the heartbeat window.
    Heartbeat,
}

/// Timer durations for one streaming session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessConfig {
    pub connect_timeout: Duration,
    /// Must exceed the backend's heartbeat interval.
    pub heartbeat_timeout: Duration,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            heartbeat_timeout: Duration::from_secs(30),
        }
    }
}

/// Connect and heartbeat deadlines of one session.
///
/// The monitor only records instants; the chat-input task sleeps until
/// [`LivenessMonitor::next_deadline`] and reports back. Both deadlines are
/// owned by the session, so dropping the session disarms them.
#[derive(Debug)]
pub struct LivenessMonitor {
    config: LivenessConfig,
    connect_deadline: Option<Instant>,
    heartbeat_deadline: Option<Instant>,
}

impl LivenessMonitor {
    /// Creates a monitor with the connect timer armed from `now`.
    pub fn arm(config: LivenessConfig, now: Instant) -> Self {
        Self {
            config,
            connect_deadline: Some(now + config.connect_timeout),
            heartbeat_deadline: None,
        }
    }

    /// Any inbound event: disarms the connect timer and re-arms the
    /// heartbeat timer from `now`.
    pub fn record_event(&mut self, now: Instant) {
        self.connect_deadline = None;
        self.heartbeat_deadline = Some(now + self.config.heartbeat_timeout);
    }

    /// Disarms both timers.
    pub fn cancel(&mut self) {
        self.connect_deadline = None;
        self.heartbeat_deadline = None;
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.connect_deadline, self.heartbeat_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Returns the timer that has elapsed at `now`, if any.
    pub fn expired(&self, now: Instant) -> Option<TimeoutKind> {
        if self.connect_deadline.is_some_and(|d| now >= d) {
            return Some(TimeoutKind::Connect);
        }
        if self.heartbeat_deadline.is_some_and(|d| now >= d) {
            return Some(TimeoutKind::Heartbeat);
        }
        None
    }
}
