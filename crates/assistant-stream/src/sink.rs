use std::sync::Mutex;

use crate::content::Role;
use crate::event::{TaskPlanning, ToolCall};
use crate::reveal::ToolStatus;

/// Identifies the message surface an instruction targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageTarget {
    pub id: uuid::Uuid,
    pub role: Role,
}

impl MessageTarget {
    pub fn new(role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            role,
        }
    }
}

/// Display content of a message: the normalized text plus its rendered form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedContent {
    pub text: String,
    /// `None` when rendering failed; hosts fall back to `text`.
    pub html: Option<String>,
}

/// A line appended below a message's content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineItem {
    /// Tool-call widget (revealed once per message).
    ToolCalls(Vec<ToolCall>),
    /// Task-plan widget (revealed once per message).
    TaskPlan(TaskPlanning),
    /// One tool result; every result is shown.
    ToolResult(String),
    /// Status change of a revealed tool call.
    ToolStatus { tool: String, status: ToolStatus },
    /// User-visible failure.
    Error(String),
}

/// Render instructions sent from the core to the host UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiInstruction {
    /// Replace the whole content of `message` (creating it if new).
    ReplaceContent {
        message: MessageTarget,
        content: RenderedContent,
    },
    /// Append a line item to `message`, or to the conversation when `None`.
    AppendLine {
        message: Option<MessageTarget>,
        item: LineItem,
    },
    /// Show or hide the processing indicator and lock/unlock the input.
    SetProcessing(bool),
}

/// Host UI surface. Opaque to the core beyond these instructions.
pub trait UiSink: Send + Sync {
    fn apply(&self, instruction: UiInstruction);
}

/// Sink that records every instruction. Useful for tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingSink {
    instructions: Mutex<Vec<UiInstruction>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything applied so far.
    pub fn instructions(&self) -> Vec<UiInstruction> {
        self.instructions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Latest content of each message, in order of first appearance.
    pub fn contents(&self) -> Vec<(MessageTarget, RenderedContent)> {
        let mut out: Vec<(MessageTarget, RenderedContent)> = Vec::new();
        for instruction in self.instructions() {
            if let UiInstruction::ReplaceContent { message, content } = instruction {
                match out.iter_mut().find(|(target, _)| *target == message) {
                    Some(entry) => entry.1 = content,
                    None => out.push((message, content)),
                }
            }
        }
        out
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.instructions()
            .into_iter()
            .filter_map(|instruction| match instruction {
                UiInstruction::AppendLine { item, .. } => Some(item),
                _ => None,
            })
            .collect()
    }

    /// Current state of the processing indicator.
    pub fn processing(&self) -> bool {
        self.instructions()
            .iter()
            .rev()
            .find_map(|instruction| match instruction {
                UiInstruction::SetProcessing(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl UiSink for RecordingSink {
    fn apply(&self, instruction: UiInstruction) {
        if let Ok(mut guard) = self.instructions.lock() {
            guard.push(instruction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_keep_latest_replacement_per_message() {
        let sink = RecordingSink::new();
        let a = MessageTarget::new(Role::Assistant);
        for text in ["He", "Hello"] {
            sink.apply(UiInstruction::ReplaceContent {
                message: a,
                content: RenderedContent {
                    text: text.into(),
                    html: None,
                },
            });
        }
        sink.apply(UiInstruction::SetProcessing(true));
        let contents = sink.contents();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].1.text, "Hello");
        assert!(sink.processing());
    }
}
