//! PromptCollector: one canonical document per logical prompt name.
//!
//! Sync writes every prompt three times (Copilot, Claude, Cursor). Any of
//! those copies may have been edited locally, so push scans all three
//! locations and reduces them to a single canonical document:
//!
//! - identical bodies: the copy carrying the most metadata wins
//! - differing bodies: a conflict; the most recently modified copy wins and
//!   a warning names every location
//!
//! Ties go to the copy seen first, in [`PromptFormat::all`] order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use rulekit_core::config::CLIENT_INJECTED_KEYS;
use rulekit_core::fs::list_files;
use rulekit_core::{frontmatter, Document};
use rulekit_renderer::PromptFormat;

use crate::error::{io_err, PushError};

/// One generated prompt file found in the target.
#[derive(Debug, Clone)]
pub struct LocalCopy {
    pub format: PromptFormat,
    pub path: PathBuf,
    pub document: Document,
    pub modified: SystemTime,
}

/// A logical prompt whose local copies disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub name: String,
    pub paths: Vec<PathBuf>,
    /// The copy that was kept.
    pub chosen: PathBuf,
}

/// The canonical pick for one logical name.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedPrompt {
    /// Format of the copy the document came from.
    pub format: PromptFormat,
    /// Canonical form: client-injected fields removed, body trimmed.
    pub document: Document,
}

/// Result of [`collect`].
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub prompts: BTreeMap<String, CollectedPrompt>,
    pub conflicts: Vec<Conflict>,
}

/// Canonical form of a local document.
pub fn canonical_form(doc: &Document) -> Document {
    Document::new(
        doc.metadata.without(CLIENT_INJECTED_KEYS),
        trimmed_body(&doc.body),
    )
}

fn trimmed_body(body: &str) -> String {
    let body = body.replace("\r\n", "\n");
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!("{body}\n")
    }
}

/// Every `rulekit-*` prompt file under `target`, grouped by logical name.
pub fn scan(target: &Path) -> Result<BTreeMap<String, Vec<LocalCopy>>, PushError> {
    let mut by_name: BTreeMap<String, Vec<LocalCopy>> = BTreeMap::new();
    for format in PromptFormat::all() {
        for path in list_files(&format.output_dir(target))? {
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| format.logical_name(n))
            else {
                continue;
            };
            let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            let modified = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .map_err(|e| io_err(&path, e))?;
            by_name.entry(name).or_default().push(LocalCopy {
                format: *format,
                path,
                document: frontmatter::parse_lenient(&raw),
                modified,
            });
        }
    }
    Ok(by_name)
}

/// Reduce the local copies under `target` to one canonical document per name.
pub fn collect(target: &Path) -> Result<Collected, PushError> {
    let mut collected = Collected::default();
    for (name, copies) in scan(target)? {
        let (chosen, conflict) = choose(&name, &copies);
        if let Some(conflict) = conflict {
            collected.conflicts.push(conflict);
        }
        collected.prompts.insert(
            name,
            CollectedPrompt {
                format: chosen.format,
                document: canonical_form(&chosen.document),
            },
        );
    }
    Ok(collected)
}

fn choose<'a>(name: &str, copies: &'a [LocalCopy]) -> (&'a LocalCopy, Option<Conflict>) {
    let first = &copies[0];
    let first_body = trimmed_body(&first.document.body);
    let all_same = copies
        .iter()
        .all(|c| trimmed_body(&c.document.body) == first_body);

    if all_same {
        let richest = copies.iter().fold(first, |best, c| {
            if richness(c) > richness(best) {
                c
            } else {
                best
            }
        });
        return (richest, None);
    }

    let newest = copies.iter().fold(first, |best, c| {
        if c.modified > best.modified {
            c
        } else {
            best
        }
    });
    let paths: Vec<PathBuf> = copies.iter().map(|c| c.path.clone()).collect();
    tracing::warn!(
        prompt = name,
        locations = ?paths,
        chosen = %newest.path.display(),
        "local copies differ; keeping the most recently modified"
    );
    let conflict = Conflict {
        name: name.to_owned(),
        paths,
        chosen: newest.path.clone(),
    };
    (newest, Some(conflict))
}

fn richness(copy: &LocalCopy) -> usize {
    copy.document.metadata.without(CLIENT_INJECTED_KEYS).len()
}
