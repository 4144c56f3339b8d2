//! Stream session controller: the synchronous state machine behind one chat
//! input.
//!
//! The controller owns at most one [`StreamSession`]. Inbound transport
//! signals and timer wake-ups are fed in by whoever delivers them (the
//! chat-input task in production, tests directly); every effect goes out
//! through the [`UiSink`]. Each session reaches exactly one
//! [`TerminalState`], and all terminal paths run the same teardown.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::content::{OneShotReply, Role};
use crate::errors::StreamFailure;
use crate::event::{InboundStreamEvent, TaskPlanning, ToolCall};
use crate::liveness::{LivenessConfig, LivenessMonitor};
use crate::markdown::MarkdownRenderer;
use crate::normalize::normalize;
use crate::reveal::{RevealTracker, Reveals};
use crate::session::{
    SessionId, SessionReport, SessionState, StreamSession, TerminalState, TransportHandle,
};
use crate::sink::{LineItem, MessageTarget, RenderedContent, UiInstruction, UiSink};

/// What the transport reports for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportSignal {
    /// The connection is established.
    Opened,
    /// Payload of one push event.
    Frame(String),
    /// The connection failed.
    Error(String),
    /// The connection ended without a `complete` event.
    Closed,
}

/// Result of [`StreamController::begin`].
#[derive(Debug)]
pub struct Begun {
    pub id: SessionId,
    pub message: MessageTarget,
    /// Report of the session this one replaced, if any.
    pub superseded: Option<SessionReport>,
}

pub struct StreamController {
    sink: Arc<dyn UiSink>,
    renderer: Arc<dyn MarkdownRenderer>,
    liveness: LivenessConfig,
    active: Option<StreamSession>,
    last_report: Option<SessionReport>,
}

impl StreamController {
    pub fn new(
        sink: Arc<dyn UiSink>,
        renderer: Arc<dyn MarkdownRenderer>,
        liveness: LivenessConfig,
    ) -> Self {
        Self {
            sink,
            renderer,
            liveness,
            active: None,
            last_report: None,
        }
    }

    /// State of the live session, else of the last finished one.
    pub fn state(&self) -> SessionState {
        match (&self.active, &self.last_report) {
            (Some(session), _) => session.state,
            (None, Some(report)) => report.terminal.state(),
            (None, None) => SessionState::Idle,
        }
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    /// Earliest liveness deadline of the live session.
    pub fn next_deadline(&self) -> Option<(SessionId, Instant)> {
        let session = self.active.as_ref()?;
        session.liveness.next_deadline().map(|at| (session.id, at))
    }

    /// Starts a session. Any live session is torn down first, then `open`
    /// is called with the new id to open the transport, then the connect
    /// timer is armed.
    pub fn begin<F>(&mut self, now: Instant, open: F) -> Begun
    where
        F: FnOnce(SessionId) -> Box<dyn TransportHandle>,
    {
        let superseded = self.supersede();
        let id = SessionId::new();
        let message = MessageTarget::new(Role::Assistant);
        let transport = open(id);
        self.sink.apply(UiInstruction::ReplaceContent {
            message,
            content: RenderedContent::default(),
        });
        let liveness = LivenessMonitor::arm(self.liveness, now);
        self.active = Some(StreamSession::new(id, message, transport, liveness));
        debug!(session_id = %id, "stream session connecting");
        Begun {
            id,
            message,
            superseded,
        }
    }

    /// Tears down the live session because a newer one replaces it.
    pub fn supersede(&mut self) -> Option<SessionReport> {
        self.finish(TerminalState::Errored(StreamFailure::Superseded))
    }

    /// User-initiated cancel of the live session.
    pub fn cancel(&mut self) -> Option<SessionReport> {
        self.finish(TerminalState::Errored(StreamFailure::Cancelled))
    }

    /// Feeds one transport signal. Signals for a session that is not the
    /// live one are ignored.
    pub fn handle_signal(
        &mut self,
        id: SessionId,
        signal: TransportSignal,
        now: Instant,
    ) -> Option<SessionReport> {
        let Some(session) = self.active.as_mut().filter(|s| s.id == id) else {
            trace!(session_id = %id, "ignoring signal for inactive session");
            return None;
        };
        match signal {
            TransportSignal::Opened => {
                session.mark_live(now);
                None
            }
            TransportSignal::Frame(data) => match InboundStreamEvent::parse(&data) {
                Ok(event) => self.handle_event(event, now),
                Err(failure) => {
                    warn!(session_id = %id, error = %failure, "dropping session on malformed event");
                    self.finish(TerminalState::Errored(failure))
                }
            },
            TransportSignal::Error(message) => {
                debug!(session_id = %id, %message, "stream transport error");
                self.finish(TerminalState::Errored(StreamFailure::transport(message)))
            }
            TransportSignal::Closed => self.finish(TerminalState::Errored(
                StreamFailure::transport("stream closed before completion"),
            )),
        }
    }

    /// Timer wake-up for `id`. A no-op unless `id` is live and one of its
    /// deadlines has passed.
    pub fn on_timer(&mut self, id: SessionId, now: Instant) -> Option<SessionReport> {
        let session = self.active.as_ref().filter(|s| s.id == id)?;
        let kind = session.liveness.expired(now)?;
        debug!(session_id = %id, ?kind, "stream session timed out");
        self.finish(TerminalState::TimedOut(kind))
    }

    /// Renders a one-shot reply as a new assistant message.
    pub fn render_one_shot(&self, reply: &OneShotReply) -> MessageTarget {
        let message = MessageTarget::new(Role::Assistant);
        let mut reveals = RevealTracker::new();
        let revealed = reveals.observe(reply.tool_calls.as_deref(), reply.task_planning.as_ref());
        self.emit_reveals(message, revealed);

        let text = display_text(
            &reply.text,
            &reveals,
            reply.tool_calls.as_deref(),
            reply.task_planning.as_ref(),
        );
        let content = match &reply.html {
            Some(html) => RenderedContent {
                text,
                html: Some(html.clone()),
            },
            None => self.render(text),
        };
        self.sink
            .apply(UiInstruction::ReplaceContent { message, content });
        message
    }

    fn handle_event(&mut self, event: InboundStreamEvent, now: Instant) -> Option<SessionReport> {
        let session = self.active.as_mut()?;
        session.mark_live(now);
        trace!(session_id = %session.id, kind = event.kind(), "stream event");
        match event {
            InboundStreamEvent::Connected | InboundStreamEvent::Heartbeat => None,
            InboundStreamEvent::Error { text } => {
                self.finish(TerminalState::Errored(StreamFailure::protocol(text)))
            }
            InboundStreamEvent::ToolResult { text } => {
                self.sink.apply(UiInstruction::AppendLine {
                    message: Some(session.message),
                    item: LineItem::ToolResult(text),
                });
                None
            }
            InboundStreamEvent::Assistant {
                text,
                tool_calls,
                task_planning,
            } => {
                self.apply_assistant(text, tool_calls, task_planning);
                None
            }
            InboundStreamEvent::ToolStatus { tool, success } => {
                match session.reveals.update_status(&tool, success) {
                    Some(status) => self.sink.apply(UiInstruction::AppendLine {
                        message: Some(session.message),
                        item: LineItem::ToolStatus { tool, status },
                    }),
                    None => debug!(session_id = %session.id, %tool, "tool status without a pending revealed call"),
                }
                None
            }
            InboundStreamEvent::Complete => self.finish(TerminalState::Completed),
        }
    }

    fn apply_assistant(
        &mut self,
        text: String,
        tool_calls: Option<Vec<ToolCall>>,
        task_planning: Option<TaskPlanning>,
    ) {
        let Some(session) = self.active.as_mut() else {
            return;
        };
        let reveals = session
            .reveals
            .observe(tool_calls.as_deref(), task_planning.as_ref());
        let message = session.message;
        if !reveals.is_empty() {
            debug!(session_id = %session.id, "revealing annotations");
        }
        if text.is_empty() {
            self.emit_reveals(message, reveals);
            return;
        }
        session.accumulated_text = text;
        let display = display_text(
            &session.accumulated_text,
            &session.reveals,
            tool_calls.as_deref(),
            task_planning.as_ref(),
        );
        session.displayed_text = display.clone();
        self.emit_reveals(message, reveals);
        let content = self.render(display);
        self.sink
            .apply(UiInstruction::ReplaceContent { message, content });
    }

    fn emit_reveals(&self, message: MessageTarget, reveals: Reveals) {
        if let Some(plan) = reveals.task_plan {
            self.sink.apply(UiInstruction::AppendLine {
                message: Some(message),
                item: LineItem::TaskPlan(plan),
            });
        }
        if let Some(calls) = reveals.tool_calls {
            self.sink.apply(UiInstruction::AppendLine {
                message: Some(message),
                item: LineItem::ToolCalls(calls),
            });
        }
    }

    fn render(&self, text: String) -> RenderedContent {
        let html = match self.renderer.render(&text) {
            Ok(html) => Some(html),
            Err(err) => {
                warn!(error = %err, "markdown render failed, showing plain text");
                None
            }
        };
        RenderedContent { text, html }
    }

    fn finish(&mut self, terminal: TerminalState) -> Option<SessionReport> {
        let session = self.active.take()?;
        let report = session.teardown(terminal);
        let failure_text = match &report.terminal {
            TerminalState::Completed => None,
            TerminalState::Errored(failure) => failure.user_message(),
            TerminalState::TimedOut(kind) => Some(kind.user_message().to_string()),
        };
        if let Some(text) = failure_text {
            self.sink.apply(UiInstruction::AppendLine {
                message: Some(report.message),
                item: LineItem::Error(text),
            });
        }
        self.sink.apply(UiInstruction::SetProcessing(false));
        debug!(session_id = %report.id, terminal = ?report.terminal, "stream session finished");
        self.last_report = Some(report.clone());
        Some(report)
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Text to show for `raw`: strips the echo of every revealed annotation.
///
/// The widget is a snapshot of the first tool list, but a later snapshot may
/// narrate other tools or omit the list entirely, so both the revealed
/// calls and the current ones are stripped.
fn display_text(
    raw: &str,
    reveals: &RevealTracker,
    tool_calls: Option<&[ToolCall]>,
    task_planning: Option<&TaskPlanning>,
) -> String {
    let mut calls = reveals.revealed_tool_calls();
    for call in tool_calls.into_iter().flatten() {
        if !calls.contains(call) {
            calls.push(call.clone());
        }
    }
    let plan = task_planning
        .filter(|p| p.has_plan)
        .or(reveals.revealed_plan());
    normalize(raw, &calls, plan, reveals.revealed())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::{DEFAULT_STREAM_ERROR, MALFORMED_EVENT_MESSAGE};
    use crate::liveness::TimeoutKind;
    use crate::markdown::PulldownMarkdownRenderer;
    use crate::reveal::ToolStatus;
    use crate::session::test_support::CountingTransport;
    use crate::sink::RecordingSink;

    fn controller() -> (StreamController, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let controller = StreamController::new(
            sink.clone(),
            Arc::new(PulldownMarkdownRenderer),
            LivenessConfig {
                connect_timeout: Duration::from_secs(15),
                heartbeat_timeout: Duration::from_secs(30),
            },
        );
        (controller, sink)
    }

    fn frame(value: serde_json::Value) -> TransportSignal {
        TransportSignal::Frame(value.to_string())
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn hello_then_complete_renders_hello() {
        let (mut controller, sink) = controller();
        let (transport, closes) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        assert_eq!(controller.state(), SessionState::Connecting);

        let none = controller.handle_signal(
            id,
            frame(serde_json::json!({"type":"assistant","text":"Hello"})),
            t0 + secs(1),
        );
        assert!(none.is_none());
        assert_eq!(controller.state(), SessionState::Streaming);

        let report = controller
            .handle_signal(id, frame(serde_json::json!({"type":"complete"})), t0 + secs(2))
            .expect("terminal");
        assert_eq!(report.terminal, TerminalState::Completed);
        assert_eq!(report.text, "Hello");
        assert_eq!(controller.state(), SessionState::Completed);
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let contents = sink.contents();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].1.text, "Hello");
        assert_eq!(contents[0].1.html.as_deref(), Some("<p>Hello</p>\n"));
        assert!(!sink.processing());
        assert!(sink.line_items().is_empty());
    }

    #[test]
    fn tool_echo_is_stripped_and_widget_revealed_once() {
        let (mut controller, sink) = controller();
        let (transport, _) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;

        for _ in 0..3 {
            controller.handle_signal(
                id,
                frame(serde_json::json!({
                    "type": "assistant",
                    "text": "调用工具：`search`\n结果是X",
                    "tool_calls": [{"tool": "search"}]
                })),
                t0,
            );
        }

        assert_eq!(
            sink.line_items(),
            vec![LineItem::ToolCalls(vec![ToolCall::new("search")])]
        );
        assert_eq!(sink.contents()[0].1.text, "结果是X");
    }

    #[test]
    fn later_snapshot_without_tool_list_still_strips_echo() {
        let (mut controller, sink) = controller();
        let (transport, _) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        controller.handle_signal(
            id,
            frame(serde_json::json!({"type":"assistant","text":"…","tool_calls":[{"tool":"search"}]})),
            t0,
        );
        controller.handle_signal(
            id,
            frame(serde_json::json!({"type":"assistant","text":"调用工具：`search`\ndone"})),
            t0,
        );
        assert_eq!(sink.contents()[0].1.text, "done");
    }

    #[test]
    fn plan_widget_precedes_tool_widget_and_plan_prose_is_stripped() {
        let (mut controller, sink) = controller();
        let (transport, _) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        controller.handle_signal(
            id,
            frame(serde_json::json!({
                "type": "assistant",
                "text": "任务计划：先搜索再总结\n\n调用工具：`search`\n答案",
                "tool_calls": [{"tool": "search"}],
                "task_planning": {"has_plan": true, "plan_text": "先搜索再总结"}
            })),
            t0,
        );
        assert_eq!(
            sink.line_items(),
            vec![
                LineItem::TaskPlan(TaskPlanning::plan("先搜索再总结")),
                LineItem::ToolCalls(vec![ToolCall::new("search")]),
            ]
        );
        assert_eq!(sink.contents()[0].1.text, "答案");
    }

    #[test]
    fn heartbeat_only_rearms() {
        let (mut controller, sink) = controller();
        let (transport, _) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        let before = sink.instructions().len();

        controller.handle_signal(id, frame(serde_json::json!({"type":"heartbeat"})), t0 + secs(10));
        assert_eq!(sink.instructions().len(), before);
        assert_eq!(controller.next_deadline(), Some((id, t0 + secs(40))));
        assert!(controller.on_timer(id, t0 + secs(39)).is_none());
        assert_eq!(controller.state(), SessionState::Streaming);
    }

    #[test]
    fn connect_timeout_when_nothing_arrives() {
        let (mut controller, sink) = controller();
        let (transport, closes) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;

        assert!(controller.on_timer(id, t0 + secs(14)).is_none());
        let report = controller.on_timer(id, t0 + secs(15)).expect("timeout");
        assert_eq!(report.terminal, TerminalState::TimedOut(TimeoutKind::Connect));
        assert_eq!(
            sink.line_items(),
            vec![LineItem::Error("connection timed out".into())]
        );
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(controller.next_deadline().is_none());
    }

    #[test]
    fn silence_after_streaming_start_times_out_and_clears_processing() {
        let (mut controller, sink) = controller();
        sink.apply(UiInstruction::SetProcessing(true));
        let (transport, closes) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        controller.handle_signal(id, TransportSignal::Opened, t0 + secs(1));

        assert!(controller.on_timer(id, t0 + secs(30)).is_none());
        let report = controller.on_timer(id, t0 + secs(31)).expect("timeout");
        assert_eq!(report.terminal, TerminalState::TimedOut(TimeoutKind::Heartbeat));
        assert_eq!(controller.state(), SessionState::TimedOut);
        assert_eq!(
            sink.line_items(),
            vec![LineItem::Error("connection interrupted".into())]
        );
        assert!(!sink.processing());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn supersede_tears_down_old_session_before_opening_new() {
        let (mut controller, sink) = controller();
        let (first, first_closes) = CountingTransport::new();
        let (second, second_closes) = CountingTransport::new();
        let t0 = Instant::now();
        let a = controller.begin(t0, |_| first).id;

        let observed = first_closes.clone();
        let begun = controller.begin(t0 + secs(1), move |_| {
            assert_eq!(observed.load(Ordering::SeqCst), 1, "old transport still open");
            second
        });
        let superseded = begun.superseded.expect("old session report");
        assert_eq!(superseded.id, a);
        assert_eq!(
            superseded.terminal,
            TerminalState::Errored(StreamFailure::Superseded)
        );
        assert_eq!(controller.active_session(), Some(begun.id));

        // Late traffic for the old session changes nothing.
        let before = sink.instructions().len();
        assert!(
            controller
                .handle_signal(a, frame(serde_json::json!({"type":"complete"})), t0 + secs(2))
                .is_none()
        );
        assert!(controller.on_timer(a, t0 + secs(3600)).is_none());
        assert_eq!(sink.instructions().len(), before);
        assert_eq!(first_closes.load(Ordering::SeqCst), 1);
        assert_eq!(second_closes.load(Ordering::SeqCst), 0);
        assert!(sink.line_items().is_empty());
    }

    #[test]
    fn error_event_is_shown_verbatim_or_defaulted() {
        for (payload, expected) in [
            (serde_json::json!({"type":"error","text":"quota exceeded"}), "quota exceeded"),
            (serde_json::json!({"type":"error"}), DEFAULT_STREAM_ERROR),
        ] {
            let (mut controller, sink) = controller();
            let (transport, closes) = CountingTransport::new();
            let t0 = Instant::now();
            let id = controller.begin(t0, |_| transport).id;
            let report = controller
                .handle_signal(id, frame(payload), t0)
                .expect("terminal");
            assert_eq!(report.terminal.state(), SessionState::Errored);
            assert_eq!(sink.line_items(), vec![LineItem::Error(expected.into())]);
            assert_eq!(closes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn malformed_event_terminates_only_the_session() {
        let (mut controller, sink) = controller();
        let (transport, closes) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        let report = controller
            .handle_signal(id, TransportSignal::Frame("{not json".into()), t0)
            .expect("terminal");
        assert!(matches!(
            report.terminal,
            TerminalState::Errored(StreamFailure::Malformed { .. })
        ));
        assert_eq!(
            sink.line_items(),
            vec![LineItem::Error(MALFORMED_EVENT_MESSAGE.into())]
        );
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let (transport, _) = CountingTransport::new();
        let next = controller.begin(t0, |_| transport);
        assert!(next.superseded.is_none());
        assert_eq!(controller.state(), SessionState::Connecting);
    }

    #[test]
    fn events_after_complete_are_ignored() {
        let (mut controller, sink) = controller();
        let (transport, closes) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        controller.handle_signal(id, frame(serde_json::json!({"type":"assistant","text":"a"})), t0);
        controller.handle_signal(id, frame(serde_json::json!({"type":"complete"})), t0);
        let before = sink.instructions();

        assert!(
            controller
                .handle_signal(id, frame(serde_json::json!({"type":"assistant","text":"late"})), t0)
                .is_none()
        );
        assert!(controller.handle_signal(id, TransportSignal::Closed, t0).is_none());
        assert!(controller.cancel().is_none());
        assert_eq!(sink.instructions(), before);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), SessionState::Completed);
    }

    #[test]
    fn every_tool_result_is_appended() {
        let (mut controller, sink) = controller();
        let (transport, _) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        for _ in 0..2 {
            controller.handle_signal(
                id,
                frame(serde_json::json!({"type":"tool_result","text":"search ok"})),
                t0,
            );
        }
        assert_eq!(
            sink.line_items(),
            vec![
                LineItem::ToolResult("search ok".into()),
                LineItem::ToolResult("search ok".into()),
            ]
        );
    }

    #[test]
    fn tool_status_applies_to_revealed_calls_only() {
        let (mut controller, sink) = controller();
        let (transport, _) = CountingTransport::new();
        let t0 = Instant::now();
        let id = controller.begin(t0, |_| transport).id;
        controller.handle_signal(
            id,
            frame(serde_json::json!({"type":"tool_status","tool":"search","success":true})),
            t0,
        );
        assert!(sink.line_items().is_empty());

        controller.handle_signal(
            id,
            frame(serde_json::json!({"type":"assistant","text":"x","tool_calls":[{"tool":"search"}]})),
            t0,
        );
        for success in [true, false] {
            controller.handle_signal(
                id,
                frame(serde_json::json!({"type":"tool_status","tool":"search","success":success})),
                t0,
            );
        }
        assert_eq!(
            sink.line_items(),
            vec![
                LineItem::ToolCalls(vec![ToolCall::new("search")]),
                LineItem::ToolStatus {
                    tool: "search".into(),
                    status: ToolStatus::Success,
                },
            ]
        );
    }

    #[test]
    fn transport_failures_end_in_errored() {
        for signal in [TransportSignal::Error("reset by peer".into()), TransportSignal::Closed] {
            let (mut controller, sink) = controller();
            let (transport, closes) = CountingTransport::new();
            let t0 = Instant::now();
            let id = controller.begin(t0, |_| transport).id;
            let report = controller.handle_signal(id, signal, t0).expect("terminal");
            assert!(matches!(
                report.terminal,
                TerminalState::Errored(StreamFailure::Transport { .. })
            ));
            assert_eq!(sink.line_items().len(), 1);
            assert_eq!(closes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn cancel_and_drop_close_transport_once() {
        let (mut controller, _sink) = controller();
        let (transport, closes) = CountingTransport::new();
        controller.begin(Instant::now(), |_| transport);
        let report = controller.cancel().expect("cancelled");
        assert_eq!(
            report.terminal,
            TerminalState::Errored(StreamFailure::Cancelled)
        );
        drop(controller);
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let (mut controller, _sink) = self::controller();
        let (transport, closes) = CountingTransport::new();
        controller.begin(Instant::now(), |_| transport);
        drop(controller);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn one_shot_reply_prefers_server_html_and_reveals_widgets() {
        let (controller, sink) = controller();
        let reply = OneShotReply {
            text: "调用工具：`search`\n答案".into(),
            html: Some("<p>server</p>".into()),
            tool_calls: Some(vec![ToolCall::new("search")]),
            ..OneShotReply::default()
        };
        controller.render_one_shot(&reply);
        assert_eq!(
            sink.line_items(),
            vec![LineItem::ToolCalls(vec![ToolCall::new("search")])]
        );
        let content = &sink.contents()[0].1;
        assert_eq!(content.text, "答案");
        assert_eq!(content.html.as_deref(), Some("<p>server</p>"));
    }
}
