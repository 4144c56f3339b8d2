//! Strips the prose echo of annotations that are already rendered as widgets.
//!
//! Matching is literal text only. Tool names come from the model and are
//! never compiled into a pattern, so metacharacters in a name are plain
//! characters. Cost is linear in the input per tool and phrase.

use crate::event::{TaskPlanning, ToolCall};
use crate::reveal::Revealed;

/// Lead-ins the assistant uses when it narrates a tool call in prose.
const TOOL_PREFIXES: &[&str] = &[
    "调用工具",
    "使用工具",
    "执行命令",
    "运行命令",
    "Calling tool",
    "Using tool",
    "Running command",
    "Executing command",
];

/// Phrases that open a prose task plan. The span runs to the next blank line.
const PLAN_PHRASES: &[&str] = &[
    "任务计划：",
    "任务计划:",
    "计划步骤：",
    "计划步骤:",
    "我将按照以下步骤",
    "Task plan:",
    "task plan:",
    "Steps:",
    "steps:",
    "I will proceed as follows",
];

/// Returns the text to display for `raw` given the annotations of the
/// current message and which of them are rendered as widgets.
///
/// With nothing revealed the text is returned unchanged. Otherwise the
/// matching tool clauses and plan spans are removed, runs of blank lines are
/// collapsed and surrounding newlines trimmed.
///
/// The text is scanned once. Characters are pushed onto the output and a
/// clause or plan span is cut as soon as the output ends with one, so text
/// joined by a cut is matched again and every prefix of the result has
/// already been checked. Normalizing the result a second time changes
/// nothing.
pub fn normalize(
    raw: &str,
    tool_calls: &[ToolCall],
    task_planning: Option<&TaskPlanning>,
    revealed: Revealed,
) -> String {
    let strip_tools = revealed.tool_calls && !tool_calls.is_empty();
    let strip_plan = revealed.task_plan && task_planning.is_some_and(|p| p.has_plan);
    if !strip_tools && !strip_plan {
        return raw.to_string();
    }

    let tools: Vec<&str> = tool_calls
        .iter()
        .map(|call| call.tool.as_str())
        .filter(|tool| strip_tools && !tool.is_empty())
        .collect();

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(ch) = rest.chars().next() {
        rest = &rest[ch.len_utf8()..];
        if ch == '\n' && out.ends_with("\n\n") {
            continue;
        }
        out.push(ch);
        if ch == '`'
            && let Some(start) = tool_clause_start(&out, &tools)
        {
            // The clause runs to the end of its line, newline included.
            out.truncate(start);
            rest = rest.find('\n').map_or("", |idx| &rest[idx + 1..]);
        } else if strip_plan && let Some(start) = plan_phrase_start(&out) {
            // The span runs to the next blank line, which is kept.
            out.truncate(start);
            rest = rest.find("\n\n").map_or("", |idx| &rest[idx..]);
        }
    }
    out.trim_matches('\n').to_string()
}

/// If `text` ends with `<prefix>[:：]<whitespace>`tool``, returns where the
/// prefix starts.
fn tool_clause_start(text: &str, tools: &[&str]) -> Option<usize> {
    let head = text.strip_suffix('`')?;
    tools.iter().find_map(|tool| {
        let head = head.strip_suffix(tool)?.strip_suffix('`')?;
        let head = head.trim_end_matches(char::is_whitespace);
        let head = head
            .strip_suffix(':')
            .or_else(|| head.strip_suffix('：'))?;
        TOOL_PREFIXES
            .iter()
            .find_map(|prefix| head.strip_suffix(prefix))
            .map(str::len)
    })
}

fn plan_phrase_start(text: &str) -> Option<usize> {
    PLAN_PHRASES
        .iter()
        .find(|phrase| text.ends_with(*phrase))
        .map(|phrase| text.len() - phrase.len())
}
