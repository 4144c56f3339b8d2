use serde::{Deserialize, Serialize};

use crate::event::{TaskPlanning, ToolCall};

/// Which annotations of the current message are rendered as widgets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Revealed {
    pub tool_calls: bool,
    pub task_plan: bool,
}

/// Derived UI state of one tool call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Pending,
    Success,
    Error,
}

/// Widgets to reveal on this tick. Each field is `Some` at most once per
/// message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reveals {
    pub task_plan: Option<TaskPlanning>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Reveals {
    pub fn is_empty(&self) -> bool {
        self.task_plan.is_none() && self.tool_calls.is_none()
    }
}

/// Tracks which side-channel annotations were already surfaced for one
/// message, so repeated stream events do not duplicate UI state.
#[derive(Clone, Debug, Default)]
pub struct RevealTracker {
    tool_calls: Option<Vec<(ToolCall, ToolStatus)>>,
    task_plan: Option<TaskPlanning>,
}

impl RevealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides which widgets an inbound payload reveals.
    ///
    /// The tool-call widget is a snapshot of the first non-empty list seen;
    /// later lists never reveal again. The plan is revealed on the first
    /// `has_plan == true`.
    pub fn observe(
        &mut self,
        tool_calls: Option<&[ToolCall]>,
        task_planning: Option<&TaskPlanning>,
    ) -> Reveals {
        let mut reveals = Reveals::default();
        if self.task_plan.is_none()
            && let Some(plan) = task_planning.filter(|p| p.has_plan)
        {
            self.task_plan = Some(plan.clone());
            reveals.task_plan = Some(plan.clone());
        }
        if self.tool_calls.is_none()
            && let Some(calls) = tool_calls.filter(|c| !c.is_empty())
        {
            self.tool_calls = Some(
                calls
                    .iter()
                    .map(|call| (call.clone(), ToolStatus::Pending))
                    .collect(),
            );
            reveals.tool_calls = Some(calls.to_vec());
        }
        reveals
    }

    pub fn revealed(&self) -> Revealed {
        Revealed {
            tool_calls: self.tool_calls.is_some(),
            task_plan: self.task_plan.is_some(),
        }
    }

    /// Tool calls in the revealed widget, in first-seen order.
    pub fn revealed_tool_calls(&self) -> Vec<ToolCall> {
        self.tool_calls
            .iter()
            .flatten()
            .map(|(call, _)| call.clone())
            .collect()
    }

    pub fn revealed_plan(&self) -> Option<&TaskPlanning> {
        self.task_plan.as_ref()
    }

    pub fn status(&self, tool: &str) -> Option<ToolStatus> {
        self.tool_calls
            .iter()
            .flatten()
            .find(|(call, _)| call.tool == tool)
            .map(|(_, status)| *status)
    }

    /// Moves every pending entry named `tool` to success or error.
    ///
    /// Returns the new status when something changed. Unknown tools and
    /// entries that already settled are left alone; statuses never go back.
    pub fn update_status(&mut self, tool: &str, success: bool) -> Option<ToolStatus> {
        let next = if success {
            ToolStatus::Success
        } else {
            ToolStatus::Error
        };
        let mut changed = false;
        for (call, status) in self.tool_calls.iter_mut().flatten() {
            if call.tool == tool && *status == ToolStatus::Pending {
                *status = next;
                changed = true;
            }
        }
        changed.then_some(next)
    }
}
