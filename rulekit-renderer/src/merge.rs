//! Rule layering: join a common body and a stack body, and take them apart again.
//!
//! The separator is [`RULE_SEPARATOR`]. Sync writes it and push splits on it,
//! so both directions must come through this module.

use rulekit_core::config::{GUIDANCE_HEADING, RULE_SEPARATOR};
use rulekit_core::StackName;

/// Join `common` and `stack` rule bodies.
///
/// - both blank: `""` (callers write nothing)
/// - one blank: the other, trimmed, with one trailing newline
/// - neither blank: `common + separator + stack + "\n"`, each trimmed
pub fn merge(common: &str, stack: &str) -> String {
    let common = common.trim();
    let stack = stack.trim();
    match (common.is_empty(), stack.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("{common}\n"),
        (true, false) => format!("{stack}\n"),
        (false, false) => format!("{common}{RULE_SEPARATOR}{stack}\n"),
    }
}

/// Recover one layer from a merged body.
///
/// For `common` this is the first segment. For any other stack it is the last
/// segment, or the only one when no separator is present.
pub fn split(merged: &str, stack: &StackName) -> String {
    let merged = normalize_newlines(merged);
    let segments: Vec<&str> = merged.split(RULE_SEPARATOR).collect();
    let segment = if stack.is_common() || segments.len() == 1 {
        segments[0]
    } else {
        segments[segments.len() - 1]
    };
    finish(segment)
}

/// The stack layer of `merged` when it starts with the known `common` body.
///
/// More precise than [`split`] when either layer itself contains the
/// separator. `Some("")` when `merged` is exactly `common`; `None` when it
/// does not begin with `common` followed by the separator.
pub fn strip_common(merged: &str, common: &str) -> Option<String> {
    let merged = normalize_newlines(merged);
    let common = normalize_newlines(common);
    let common = common.trim();
    if common.is_empty() {
        return None;
    }
    let rest = merged.trim_start().strip_prefix(common)?;
    if rest.trim().is_empty() {
        return Some(String::new());
    }
    let rest = rest.strip_prefix(RULE_SEPARATOR)?;
    Some(finish(rest))
}

/// Append the rendered guidance section to a merged body.
pub fn append_guidance(merged: &str, guidance: &str) -> String {
    let guidance = guidance.trim();
    if guidance.is_empty() {
        return merged.to_owned();
    }
    format!("{}\n\n{guidance}\n", merged.trim_end())
}

/// Remove the guidance section: from the [`GUIDANCE_HEADING`] line up to the
/// next level-one or level-two heading, or the end of the body.
pub fn strip_guidance(body: &str) -> String {
    let body = normalize_newlines(body);
    let lines: Vec<&str> = body.lines().collect();
    let Some(start) = lines.iter().position(|l| l.trim_end() == GUIDANCE_HEADING) else {
        return finish(&body);
    };
    let end = lines[start + 1..]
        .iter()
        .position(|l| is_top_heading(l))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());

    let kept: Vec<&str> = lines[..start]
        .iter()
        .chain(lines[end..].iter())
        .copied()
        .collect();
    finish(&kept.join("\n"))
}

fn is_top_heading(line: &str) -> bool {
    line.starts_with("# ") || line.starts_with("## ")
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn finish(segment: &str) -> String {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
