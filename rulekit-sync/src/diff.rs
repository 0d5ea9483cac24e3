//! Dry-run unified diff support for `rulekit diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use rulekit_core::fs::{display_relative, read_optional_bytes};
use rulekit_renderer::TemplateEngine;

use crate::pipeline::{self, SyncOptions};
use crate::writer::PlannedFile;
use crate::SyncError;

/// A single planned file whose content differs from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff result for a target project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub target: PathBuf,
    pub diffs: Vec<FileDiff>,
}

/// Render what `sync` would generate and compare it to current on-disk content.
///
/// No files are written.
pub fn diff_target(opts: &SyncOptions, engine: &TemplateEngine) -> Result<DiffResult, SyncError> {
    let mut diffs = Vec::new();
    for file in pipeline::plan(opts, engine)? {
        let existing = read_optional_bytes(&file.path)?.unwrap_or_default();
        if let Some(diff) = diff_file(&file, &existing, &opts.target) {
            diffs.push(diff);
        }
    }
    Ok(DiffResult {
        target: opts.target.clone(),
        diffs,
    })
}

fn diff_file(file: &PlannedFile, existing: &[u8], root: &Path) -> Option<FileDiff> {
    if existing == file.contents.as_slice() {
        return None;
    }

    let relative = display_relative(&file.path, root);
    let old_header = format!("a/{relative}");
    let new_header = format!("b/{relative}");

    let unified = match (
        std::str::from_utf8(existing),
        std::str::from_utf8(&file.contents),
    ) {
        (Ok(old), Ok(new)) => {
            let old = normalize_line_endings(old);
            if old == new {
                // Sync compares bytes, so it will rewrite this file.
                format!("Line endings differ in {old_header}; sync rewrites {new_header} with LF\n")
            } else {
                TextDiff::from_lines(old.as_str(), new)
                    .unified_diff()
                    .header(&old_header, &new_header)
                    .context_radius(3)
                    .to_string()
            }
        }
        _ => format!("Binary files {old_header} and {new_header} differ\n"),
    };

    Some(FileDiff {
        path: file.path.clone(),
        unified_diff: unified,
    })
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
