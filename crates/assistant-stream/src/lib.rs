//! Streaming-session client for a chat assistant backend.
//!
//! The backend answers a chat turn either as a server-push (SSE) stream of
//! cumulative snapshots or, when streaming is unavailable, as a single
//! request/response reply. This crate turns either into render
//! instructions for a host UI: it normalizes snapshot text, reveals
//! tool-call and task-plan widgets once per message, watches the push
//! connection for liveness, and guarantees that every session ends in
//! exactly one terminal state with its transport closed.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assistant_stream::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let config = ClientConfig::from_env()?;
//! let sink = Arc::new(RecordingSink::new());
//! let chat = ChatInput::spawn(
//!     Arc::new(HttpBackend::new(&config)?),
//!     sink.clone(),
//!     Arc::new(PulldownMarkdownRenderer),
//!     &config,
//! );
//!
//! match chat.send("Say hello").await?.outcome().await? {
//!     TurnOutcome::Streamed(report) => println!("{}", report.text),
//!     TurnOutcome::OneShot(reply) => println!("{}", reply.text),
//!     TurnOutcome::Failed(err) => eprintln!("{err}"),
//! }
//! # Ok(())
//! # }
//! ```

/// Backend collaborators and their HTTP implementation.
pub mod backend;
/// Chat-input actor serializing commands, transport signals and timers.
pub mod chat;
/// Client configuration.
pub mod config;
/// Chat messages and request/response payloads.
pub mod content;
/// Stream session controller.
pub mod controller;
/// Public error types and user-facing failure texts.
pub mod errors;
/// Inbound push events.
pub mod event;
/// Connect and heartbeat timers.
pub mod liveness;
/// Markdown renderer collaborator.
pub mod markdown;
/// Snapshot text normalization.
pub mod normalize;
/// Process-wide tracing setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Once-per-message widget reveal tracking.
pub mod reveal;
/// Session identity, lifecycle states and transport ownership.
pub mod session;
/// UI sink contract.
pub mod sink;
/// Server-sent event decoding.
pub mod sse;

pub use backend::{Backend, HttpBackend};
pub use chat::{ChatInput, ChatInputHandle, PendingTurn, TurnOutcome};
pub use config::ClientConfig;
pub use content::{ChatMessage, OneShotReply, Role, StreamSetup};
pub use controller::{Begun, StreamController, TransportSignal};
pub use errors::{ClientError, StreamFailure};
pub use event::{InboundStreamEvent, TaskPlanning, ToolCall};
pub use liveness::{LivenessConfig, LivenessMonitor, TimeoutKind};
pub use markdown::{MarkdownError, MarkdownRenderer, PulldownMarkdownRenderer};
pub use normalize::normalize;
pub use observability::init_observability;
pub use reveal::{RevealTracker, Revealed, Reveals, ToolStatus};
pub use session::{
    SessionId, SessionReport, SessionState, TaskTransport, TerminalState, TransportHandle,
};
pub use sink::{LineItem, MessageTarget, RecordingSink, RenderedContent, UiInstruction, UiSink};
pub use sse::{FrameStream, SseDecoder, SseFrame};
