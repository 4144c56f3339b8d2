//! Chat-input actor.
//!
//! One task owns the [`StreamController`] of a chat input and serializes
//! everything that touches it: user commands, transport signals from the
//! pump task of the live session, and liveness timer wake-ups.

use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::content::{OneShotReply, Role};
use crate::controller::{StreamController, TransportSignal};
use crate::errors::ClientError;
use crate::markdown::MarkdownRenderer;
use crate::session::{SessionId, SessionReport, TaskTransport, TransportHandle};
use crate::sink::{LineItem, MessageTarget, RenderedContent, UiInstruction, UiSink};

const COMMAND_BUFFER_CAPACITY: usize = 16;

/// How one user turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The turn was served by a push stream; the report carries its terminal
    /// state.
    Streamed(SessionReport),
    /// The one-shot fallback answered.
    OneShot(OneShotReply),
    /// Neither streaming nor the fallback produced a reply.
    Failed(ClientError),
}

/// Resolves once the turn started by [`ChatInputHandle::send`] has ended.
pub struct PendingTurn {
    rx: oneshot::Receiver<TurnOutcome>,
}

impl PendingTurn {
    pub async fn outcome(self) -> Result<TurnOutcome, ClientError> {
        self.rx.await.map_err(|_| ClientError::ActorClosed)
    }
}

enum Command {
    Send {
        message: String,
        reply: oneshot::Sender<TurnOutcome>,
    },
    Cancel,
}

/// Cloneable handle to a running chat input. The actor stops, tearing down
/// any live session, once every handle is dropped.
#[derive(Clone)]
pub struct ChatInputHandle {
    tx: mpsc::Sender<Command>,
}

impl ChatInputHandle {
    /// Submits a user message. A live session of an earlier turn is
    /// superseded.
    pub async fn send(&self, message: impl Into<String>) -> Result<PendingTurn, ClientError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ClientError::Validation("message must not be empty".into()));
        }
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Send { message, reply })
            .await
            .map_err(|_| ClientError::ActorClosed)?;
        Ok(PendingTurn { rx })
    }

    /// Cancels the live session, if any.
    pub async fn cancel(&self) -> Result<(), ClientError> {
        self.tx
            .send(Command::Cancel)
            .await
            .map_err(|_| ClientError::ActorClosed)
    }
}

pub struct ChatInput;

impl ChatInput {
    /// Spawns the actor on the current tokio runtime.
    pub fn spawn(
        backend: Arc<dyn Backend>,
        sink: Arc<dyn UiSink>,
        renderer: Arc<dyn MarkdownRenderer>,
        config: &ClientConfig,
    ) -> ChatInputHandle {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER_CAPACITY);
        let (signal_tx, signals) = mpsc::channel(config.event_buffer_capacity.max(1));
        let task = ChatInputTask {
            controller: StreamController::new(sink.clone(), renderer, config.liveness),
            backend,
            sink,
            signal_tx,
            pending: None,
        };
        tokio::spawn(task.run(commands, signals));
        ChatInputHandle { tx }
    }
}

type Signal = (SessionId, TransportSignal);

struct ChatInputTask {
    controller: StreamController,
    backend: Arc<dyn Backend>,
    sink: Arc<dyn UiSink>,
    signal_tx: mpsc::Sender<Signal>,
    /// Turn waiting on the live session.
    pending: Option<(SessionId, oneshot::Sender<TurnOutcome>)>,
}

impl ChatInputTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>, mut signals: mpsc::Receiver<Signal>) {
        loop {
            let deadline = self.controller.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Send { message, reply }) => self.send(message, reply).await,
                    Some(Command::Cancel) => {
                        if let Some(report) = self.controller.cancel() {
                            self.resolve(report);
                        }
                    }
                    None => break,
                },
                Some((id, signal)) = signals.recv() => {
                    if let Some(report) = self.controller.handle_signal(id, signal, Instant::now()) {
                        self.resolve(report);
                    }
                }
                id = wait_for(deadline) => {
                    if let Some(report) = self.controller.on_timer(id, Instant::now()) {
                        self.resolve(report);
                    }
                }
            }
        }
        debug!("all chat input handles dropped, shutting down");
        if let Some(report) = self.controller.cancel() {
            self.resolve(report);
        }
    }

    async fn send(&mut self, message: String, reply: oneshot::Sender<TurnOutcome>) {
        if let Some(report) = self.controller.supersede() {
            self.resolve(report);
        }
        self.sink.apply(UiInstruction::ReplaceContent {
            message: MessageTarget::new(Role::User),
            content: RenderedContent {
                text: message.clone(),
                html: None,
            },
        });
        self.sink.apply(UiInstruction::SetProcessing(true));

        let setup = match self.backend.start_stream(&message).await {
            Ok(setup) => setup.streaming_url().map(str::to_owned).ok_or_else(|| {
                ClientError::TransportSetup(format!(
                    "backend answered {:?} without a stream url",
                    setup.status
                ))
            }),
            Err(err) => Err(ClientError::TransportSetup(err.to_string())),
        };

        match setup {
            Ok(url) => {
                let backend = self.backend.clone();
                let signal_tx = self.signal_tx.clone();
                let begun = self.controller.begin(Instant::now(), move |id| {
                    let task = tokio::spawn(pump(backend, url, id, signal_tx));
                    Box::new(TaskTransport::new(task)) as Box<dyn TransportHandle>
                });
                self.pending = Some((begun.id, reply));
            }
            Err(err) => {
                warn!(error = %err, "stream unavailable, falling back to one-shot chat");
                let outcome = self.one_shot(&message).await;
                let _ = reply.send(outcome);
            }
        }
    }

    async fn one_shot(&mut self, message: &str) -> TurnOutcome {
        let outcome = match self.backend.chat(message).await {
            Ok(reply) => {
                self.controller.render_one_shot(&reply);
                TurnOutcome::OneShot(reply)
            }
            Err(err) => {
                warn!(error = %err, "one-shot chat failed");
                self.sink.apply(UiInstruction::AppendLine {
                    message: None,
                    item: LineItem::Error(format!("request failed: {err}")),
                });
                TurnOutcome::Failed(err)
            }
        };
        self.sink.apply(UiInstruction::SetProcessing(false));
        outcome
    }

    fn resolve(&mut self, report: SessionReport) {
        match self.pending.take() {
            Some((id, reply)) if id == report.id => {
                let _ = reply.send(TurnOutcome::Streamed(report));
            }
            other => self.pending = other,
        }
    }
}

async fn wait_for(deadline: Option<(SessionId, Instant)>) -> SessionId {
    match deadline {
        Some((id, at)) => {
            tokio::time::sleep_until(at).await;
            id
        }
        None => std::future::pending().await,
    }
}

/// Reads the push connection of session `id` and forwards what it sees.
/// Runs until the stream ends or the session's transport aborts it.
async fn pump(backend: Arc<dyn Backend>, url: String, id: SessionId, tx: mpsc::Sender<Signal>) {
    let mut frames = match backend.open_events(&url).await {
        Ok(frames) => frames,
        Err(err) => {
            let _ = tx.send((id, TransportSignal::Error(err.to_string()))).await;
            return;
        }
    };
    if tx.send((id, TransportSignal::Opened)).await.is_err() {
        return;
    }
    while let Some(next) = frames.next().await {
        let signal = match next {
            Ok(frame) => TransportSignal::Frame(frame.data),
            Err(err) => {
                let _ = tx.send((id, TransportSignal::Error(err.to_string()))).await;
                return;
            }
        };
        if tx.send((id, signal)).await.is_err() {
            return;
        }
    }
    let _ = tx.send((id, TransportSignal::Closed)).await;
}
