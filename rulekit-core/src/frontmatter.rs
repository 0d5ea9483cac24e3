//! Frontmatter codec.
//!
//! A document may open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! description: Review the code
//! model: opus
//! ---
//! # Code Review
//! ```
//!
//! [`parse`] splits it into [`Metadata`] and body; [`serialize`] joins them
//! again. For any body and any non-empty metadata,
//! `parse(&serialize(body, md))` returns exactly `(md, body)`.

use serde_yaml::{Mapping, Value};

use crate::error::CoreError;
use crate::types::{Document, Metadata};

const FENCE: &str = "---";

/// Split a leading frontmatter block from `raw`.
///
/// Text without an opening fence, or with an opening fence that is never
/// closed, is returned whole as the body with empty metadata. An empty block
/// yields empty metadata.
pub fn parse(raw: &str) -> Result<Document, CoreError> {
    let Some((yaml, body)) = split_block(raw) else {
        return Ok(Document::plain(raw));
    };
    if yaml.trim().is_empty() {
        return Ok(Document::plain(body));
    }
    let metadata = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Metadata(map),
        Value::Null => Metadata::new(),
        _ => return Err(CoreError::FrontmatterNotMapping),
    };
    Ok(Document::new(metadata, body))
}

/// Emit `body` behind a frontmatter block built from `metadata`.
///
/// Empty metadata emits the body unchanged.
pub fn serialize(body: &str, metadata: &Metadata) -> Result<String, CoreError> {
    if metadata.is_empty() {
        return Ok(body.to_owned());
    }
    let yaml = serde_yaml::to_string(&metadata.0)?;
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n{body}"))
}

/// Serialize a whole [`Document`].
pub fn to_markdown(doc: &Document) -> Result<String, CoreError> {
    serialize(&doc.body, &doc.metadata)
}

/// Parse `raw`, dropping frontmatter that fails to parse instead of erroring.
///
/// Used where a broken header should count as "no signal".
pub fn parse_lenient(raw: &str) -> Document {
    match parse(raw) {
        Ok(doc) => doc,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring unparsable frontmatter");
            let body = split_block(raw).map(|(_, body)| body).unwrap_or(raw);
            Document::plain(body)
        }
    }
}

/// Build metadata from string pairs, preserving order.
pub fn metadata<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Metadata {
    let map: Mapping = pairs
        .into_iter()
        .map(|(k, v)| (Value::from(k), Value::from(v)))
        .collect();
    Metadata(map)
}

/// `(yaml, body)` when `raw` opens with a fenced block that is closed.
fn split_block(raw: &str) -> Option<(&str, &str)> {
    let after_open = strip_fence_line(raw)?;
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == FENCE {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn strip_fence_line(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix(FENCE)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}
