//! Common imports for hosting a chat input.
pub use crate::{
    Backend, ChatInput, ChatInputHandle, ClientConfig, ClientError, HttpBackend, LineItem,
    MarkdownRenderer, MessageTarget, PendingTurn, PulldownMarkdownRenderer, RecordingSink,
    RenderedContent, Role, SessionReport, TerminalState, TurnOutcome, UiInstruction, UiSink,
};
