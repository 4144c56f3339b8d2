use std::fmt;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::errors::StreamFailure;
use crate::liveness::{LivenessMonitor, TimeoutKind};
use crate::reveal::RevealTracker;
use crate::sink::MessageTarget;

/// Identity of one streaming session. Signals and timers carry it so that
/// anything addressed to a torn-down session is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Owner of the underlying push connection. `close` must be idempotent.
pub trait TransportHandle: Send {
    fn close(&mut self);
    fn is_closed(&self) -> bool;
}

/// Transport whose connection lives in a spawned pump task. Closing aborts
/// the task, which drops the HTTP response and with it the connection.
#[derive(Debug)]
pub struct TaskTransport {
    task: Option<JoinHandle<()>>,
}

impl TaskTransport {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }
}

impl TransportHandle for TaskTransport {
    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_closed(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for TaskTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Lifecycle state of a streaming session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Errored,
    TimedOut,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::TimedOut)
    }
}

/// How a session ended. Reached exactly once per session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalState {
    Completed,
    Errored(StreamFailure),
    TimedOut(TimeoutKind),
}

impl TerminalState {
    pub fn state(&self) -> SessionState {
        match self {
            Self::Completed => SessionState::Completed,
            Self::Errored(_) => SessionState::Errored,
            Self::TimedOut(_) => SessionState::TimedOut,
        }
    }
}

/// Summary produced by the session teardown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub id: SessionId,
    pub message: MessageTarget,
    pub terminal: TerminalState,
    /// Last text displayed for the assistant message (after normalization).
    pub text: String,
}

/// One live push connection and the state assembled from it.
pub(crate) struct StreamSession {
    pub(crate) id: SessionId,
    pub(crate) message: MessageTarget,
    pub(crate) state: SessionState,
    pub(crate) liveness: LivenessMonitor,
    pub(crate) reveals: RevealTracker,
    /// Latest full snapshot from the backend; replaced, never appended to.
    pub(crate) accumulated_text: String,
    pub(crate) displayed_text: String,
    transport: Box<dyn TransportHandle>,
}

impl StreamSession {
    pub(crate) fn new(
        id: SessionId,
        message: MessageTarget,
        transport: Box<dyn TransportHandle>,
        liveness: LivenessMonitor,
    ) -> Self {
        Self {
            id,
            message,
            state: SessionState::Connecting,
            liveness,
            reveals: RevealTracker::new(),
            accumulated_text: String::new(),
            displayed_text: String::new(),
            transport,
        }
    }

    /// Records inbound activity: the first one moves the session to
    /// `Streaming`, every one re-arms the heartbeat.
    pub(crate) fn mark_live(&mut self, now: Instant) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::Streaming;
        }
        self.liveness.record_event(now);
    }

    /// The single exit path: disarms timers and closes the transport.
    pub(crate) fn teardown(mut self, terminal: TerminalState) -> SessionReport {
        self.liveness.cancel();
        self.transport.close();
        self.state = terminal.state();
        SessionReport {
            id: self.id,
            message: self.message,
            terminal,
            text: std::mem::take(&mut self.displayed_text),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.liveness.cancel();
        if !self.transport.is_closed() {
            self.transport.close();
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::test_support::CountingTransport;
    use super::*;
    use crate::content::Role;
    use crate::liveness::LivenessConfig;

    fn session(transport: Box<dyn TransportHandle>) -> StreamSession {
        StreamSession::new(
            SessionId::new(),
            MessageTarget::new(Role::Assistant),
            transport,
            LivenessMonitor::arm(LivenessConfig::default(), Instant::now()),
        )
    }

    #[test]
    fn teardown_closes_transport_once_even_after_drop() {
        let (transport, closes) = CountingTransport::new();
        let report = session(transport).teardown(TerminalState::Completed);
        assert_eq!(report.terminal.state(), SessionState::Completed);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_a_live_session_closes_transport() {
        let (transport, closes) = CountingTransport::new();
        drop(session(transport));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn first_activity_moves_to_streaming() {
        let (transport, _) = CountingTransport::new();
        let mut s = session(transport);
        assert_eq!(s.state, SessionState::Connecting);
        s.mark_live(Instant::now());
        assert_eq!(s.state, SessionState::Streaming);
    }

    #[tokio::test]
    async fn task_transport_close_aborts_task() {
        let task = tokio::spawn(std::future::pending::<()>());
        let mut transport = TaskTransport::new(task);
        assert!(!transport.is_closed());
        transport.close();
        transport.close();
        assert!(transport.is_closed());
    }
}
