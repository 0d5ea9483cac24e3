//! Rule write-back: recover the stack layer of each merged rule document.

use std::path::{Path, PathBuf};

use rulekit_core::config::{RULES_DIR, RULE_FILE, SCAN_SKIP_DIRS, STACK_KEY};
use rulekit_core::fs::{display_relative, read_optional, walk_files};
use rulekit_core::{frontmatter, Document, StackName};
use rulekit_renderer::merge;

use crate::error::{io_err, PushError};

/// A merged rule document found in the target.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRule {
    /// Directory relative to the target root; empty for the root document.
    pub dir: PathBuf,
    pub stack: StackName,
    pub body: String,
}

/// Every `AGENTS.md` under `target` that carries a `stack:` field.
///
/// Tool and dependency directories are not scanned; unparsable documents
/// are skipped.
pub fn merged_rules(target: &Path) -> Result<Vec<MergedRule>, PushError> {
    let mut out = Vec::new();
    for path in walk_files(target, SCAN_SKIP_DIRS)? {
        if path.file_name().and_then(|n| n.to_str()) != Some(RULE_FILE) {
            continue;
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let doc = match frontmatter::parse(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "skipping unparsable rule document");
                continue;
            }
        };
        let Some(stack) = doc.metadata.get_text(STACK_KEY) else {
            continue;
        };
        let dir = path
            .parent()
            .and_then(|p| p.strip_prefix(target).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        out.push(MergedRule {
            dir,
            stack: StackName::from(stack.trim()),
            body: doc.body,
        });
    }
    Ok(out)
}

/// `<root>/rules/<stack>/<dir>/AGENTS.md`
pub fn canonical_rule_path(root: &Path, stack: &StackName, dir: &Path) -> PathBuf {
    root.join(RULES_DIR).join(stack.as_str()).join(dir).join(RULE_FILE)
}

fn read_canonical(path: &Path) -> Result<Option<Document>, PushError> {
    Ok(read_optional(path)?.map(|raw| frontmatter::parse_lenient(&raw)))
}

/// The `stack` layer of a merged body, with the injected guidance removed.
///
/// `common_body` is the current canonical common layer for the same
/// directory; when the merged body still starts with it, everything after
/// it is the stack layer. A directory without a common layer was synced
/// from the stack layer alone, so the whole body belongs to it. Otherwise
/// the positional split applies.
pub fn stack_layer(merged: &str, stack: &StackName, common_body: Option<&str>) -> String {
    let body = merge::strip_guidance(merged);
    if stack.is_common() {
        return body;
    }
    match common_body.filter(|common| !common.trim().is_empty()) {
        None => body,
        Some(common) => merge::strip_common(&body, common).unwrap_or_else(|| merge::split(&body, stack)),
    }
}

fn normalized(body: &str) -> String {
    let body = body.replace("\r\n", "\n");
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!("{body}\n")
    }
}

/// Write changed stack layers into `scratch`. Returns the canonical paths
/// written, relative to `scratch`.
pub fn push_rules(target: &Path, scratch: &Path, stack: &StackName) -> Result<Vec<String>, PushError> {
    let common = StackName::common();
    let mut changed = Vec::new();

    for rule in merged_rules(target)? {
        if &rule.stack != stack {
            tracing::warn!(
                dir = %rule.dir.display(),
                synced = %rule.stack,
                pushing = %stack,
                "rule document was synced for another stack; skipping"
            );
            continue;
        }

        let common_doc = read_canonical(&canonical_rule_path(scratch, &common, &rule.dir))?;
        let layer = stack_layer(&rule.body, stack, common_doc.as_ref().map(|d| d.body.as_str()));
        if layer.is_empty() {
            tracing::debug!(dir = %rule.dir.display(), "no {stack} layer in merged document");
            continue;
        }

        let path = canonical_rule_path(scratch, stack, &rule.dir);
        let existing = read_canonical(&path)?;
        let existing_body = existing.as_ref().map(|d| normalized(&d.body)).unwrap_or_default();
        if existing_body == layer {
            continue;
        }

        let metadata = existing.map(|d| d.metadata).unwrap_or_default();
        let text = frontmatter::serialize(&layer, &metadata)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(&path, text).map_err(|e| io_err(&path, e))?;
        let relative = display_relative(&path, scratch);
        tracing::info!(path = %relative, "updated rule");
        changed.push(relative);
    }
    Ok(changed)
}
