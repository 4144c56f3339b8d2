use std::collections::HashMap;
use std::io::Write as _;
use std::sync::Mutex;

use assistant_stream::prelude::*;
use assistant_stream::reveal::ToolStatus;

/// Prints assistant output to stdout as it streams in.
///
/// Snapshots replace the whole message, so only the part past what was
/// already printed is written; when a snapshot rewrites earlier text the
/// message is printed again on a fresh line.
#[derive(Default)]
pub struct TerminalSink {
    printed: Mutex<HashMap<uuid::Uuid, String>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What to write for a new snapshot given what is already on screen.
fn delta(printed: &str, next: &str) -> String {
    match next.strip_prefix(printed) {
        Some(rest) => rest.to_string(),
        None => format!("\n{next}"),
    }
}

fn describe(item: &LineItem) -> String {
    match item {
        LineItem::ToolCalls(calls) => {
            let names: Vec<&str> = calls.iter().map(|call| call.tool.as_str()).collect();
            format!("[tools] {}", names.join(", "))
        }
        LineItem::TaskPlan(plan) => format!("[plan] {}", plan.plan_text),
        LineItem::ToolResult(text) => format!("[tool result] {text}"),
        LineItem::ToolStatus { tool, status } => {
            let status = match status {
                ToolStatus::Pending => "pending",
                ToolStatus::Success => "ok",
                ToolStatus::Error => "failed",
            };
            format!("[tool {tool}] {status}")
        }
        LineItem::Error(text) => format!("error: {text}"),
    }
}

impl UiSink for TerminalSink {
    fn apply(&self, instruction: UiInstruction) {
        match instruction {
            UiInstruction::ReplaceContent { message, content } => {
                if message.role == Role::User {
                    return;
                }
                let Ok(mut printed) = self.printed.lock() else {
                    return;
                };
                let seen = printed.entry(message.id).or_default();
                let out = delta(seen, &content.text);
                *seen = content.text;
                print!("{out}");
                let _ = std::io::stdout().flush();
            }
            UiInstruction::AppendLine { item, .. } => match item {
                LineItem::Error(_) => eprintln!("\n{}", describe(&item)),
                _ => println!("\n{}", describe(&item)),
            },
            UiInstruction::SetProcessing(false) => println!(),
            UiInstruction::SetProcessing(true) => {}
        }
    }
}
