//! Prompt formats: [`PromptFormat`] enum and its three generators.
//!
//! # Path mapping
//!
//! | Format  | Output path                                   | Header                         |
//! |---------|-----------------------------------------------|--------------------------------|
//! | Copilot | `.github/prompts/rulekit-<name>.prompt.md`    | always: derived `name`, `description`, `agent`, then source fields |
//! | Claude  | `.claude/commands/rulekit-<name>.md`          | only when there is something to say |
//! | Cursor  | `.cursor/commands/rulekit-<name>.md`          | never                          |
//!
//! Generators never touch the body: every variant carries the source body
//! byte for byte.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;

use rulekit_core::config::{
    join_segments, AGENT_KEY, AGENT_VALUE, CLAUDE_ALLOWED_KEYS, CLAUDE_COMMANDS_DIR,
    CLAUDE_COMMANDS_EXT, COPILOT_PROMPTS_DIR, COPILOT_PROMPTS_EXT, CURSOR_COMMANDS_DIR,
    CURSOR_COMMANDS_EXT, DESCRIPTION_KEY, NAME_KEY, NAME_PREFIX,
};
use rulekit_core::{frontmatter, Document, Metadata};

use crate::error::RenderError;

/// The editor conventions a canonical prompt is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptFormat {
    /// GitHub Copilot prompt files: headered.
    Copilot,
    /// Claude Code slash commands: optional header.
    Claude,
    /// Cursor commands: pass-through.
    Cursor,
}

impl PromptFormat {
    /// All formats in a stable order, richest header first.
    pub fn all() -> &'static [PromptFormat] {
        &[PromptFormat::Copilot, PromptFormat::Claude, PromptFormat::Cursor]
    }

    /// Directory segments, relative to the target root.
    pub fn dir_segments(&self) -> &'static [&'static str] {
        match self {
            PromptFormat::Copilot => COPILOT_PROMPTS_DIR,
            PromptFormat::Claude => CLAUDE_COMMANDS_DIR,
            PromptFormat::Cursor => CURSOR_COMMANDS_DIR,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            PromptFormat::Copilot => COPILOT_PROMPTS_EXT,
            PromptFormat::Claude => CLAUDE_COMMANDS_EXT,
            PromptFormat::Cursor => CURSOR_COMMANDS_EXT,
        }
    }

    /// `<root>/<format dir>`
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        join_segments(root, self.dir_segments())
    }

    /// `rulekit-<logical><ext>`
    pub fn file_name(&self, logical_name: &str) -> String {
        format!("{NAME_PREFIX}{logical_name}{}", self.extension())
    }

    /// Official output path for `logical_name`, relative to `root`.
    pub fn output_path(&self, root: &Path, logical_name: &str) -> PathBuf {
        self.output_dir(root).join(self.file_name(logical_name))
    }

    /// Inverse of [`file_name`](Self::file_name): `None` for files rulekit did not generate.
    pub fn logical_name(&self, file_name: &str) -> Option<String> {
        let name = file_name
            .strip_prefix(NAME_PREFIX)?
            .strip_suffix(self.extension())?;
        (!name.is_empty() && !name.contains('/')).then(|| name.to_owned())
    }

    /// Render `source` for this format.
    pub fn render(&self, source: &Document, logical_name: &str) -> Result<String, RenderError> {
        match self {
            PromptFormat::Copilot => headered(source, logical_name),
            PromptFormat::Claude => optional_headered(source, logical_name),
            PromptFormat::Cursor => Ok(pass_through(source)),
        }
    }
}

impl fmt::Display for PromptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptFormat::Copilot => write!(f, "copilot"),
            PromptFormat::Claude => write!(f, "claude"),
            PromptFormat::Cursor => write!(f, "cursor"),
        }
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// The body's heading, else the logical name.
pub fn derive_description(source: &Document, logical_name: &str) -> String {
    source
        .heading()
        .map_or_else(|| logical_name.to_owned(), str::to_owned)
}

/// Source `description`, else [`derive_description`].
pub fn describe(source: &Document, logical_name: &str) -> String {
    source
        .metadata
        .get_text(DESCRIPTION_KEY)
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| derive_description(source, logical_name))
}

/// `rulekit-<logical>`
pub fn display_name(logical_name: &str) -> String {
    format!("{NAME_PREFIX}{logical_name}")
}

fn pass_through(source: &Document) -> String {
    source.body.clone()
}

fn headered(source: &Document, logical_name: &str) -> Result<String, RenderError> {
    let mut md = Metadata::new();
    md.insert_str(NAME_KEY, display_name(logical_name));
    md.insert_str(DESCRIPTION_KEY, derive_description(source, logical_name));
    md.insert_str(AGENT_KEY, AGENT_VALUE);
    for (key, value) in source.metadata.iter() {
        if !md.0.contains_key(key) {
            md.insert(key.clone(), value.clone());
        }
    }
    Ok(frontmatter::serialize(&source.body, &md)?)
}

fn optional_headered(source: &Document, logical_name: &str) -> Result<String, RenderError> {
    let recognised = CLAUDE_ALLOWED_KEYS
        .iter()
        .any(|key| source.metadata.contains_key(key));
    if !recognised && source.heading().is_none() {
        return Ok(source.body.clone());
    }

    let mut md = Metadata::new();
    md.insert_str(DESCRIPTION_KEY, describe(source, logical_name));
    for key in CLAUDE_ALLOWED_KEYS.iter().filter(|k| **k != DESCRIPTION_KEY) {
        if let Some(value) = source.metadata.get(key) {
            md.insert(Value::from(*key), value.clone());
        }
    }
    Ok(frontmatter::serialize(&source.body, &md)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
