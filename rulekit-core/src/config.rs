//! Naming conventions shared by sync and push, plus the optional user settings file.
//!
//! # Source-of-truth layout
//!
//! ```text
//! <source>/
//!   rules/<stack>/<dir>/AGENTS.md
//!   prompts/<stack>/<name>.md
//!   skills/<skill>/SKILL.md
//! ```
//!
//! # Target layout
//!
//! ```text
//! <target>/
//!   <dir>/AGENTS.md                          (merged rules, `stack:` in frontmatter)
//!   .cursor/commands/rulekit-<name>.md
//!   .github/prompts/rulekit-<name>.prompt.md
//!   .claude/commands/rulekit-<name>.md
//!   .claude/skills/<skill>/
//! ```
//!
//! Every literal that sync writes and push reads back lives here so the two
//! directions cannot drift apart.
//!
//! # Settings
//!
//! `~/.rulekit/config.yaml`, all keys optional. Like the rest of the crate,
//! the loader has an explicit-home `_at` form for tests and a convenience
//! wrapper that uses `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

// ---------------------------------------------------------------------------
// 1. Stacks and rules
// ---------------------------------------------------------------------------

/// The universal base layer.
pub const COMMON_STACK: &str = "common";

/// File name of a rule document, both in the source tree and in targets.
pub const RULE_FILE: &str = "AGENTS.md";

/// Joins the common body and the stack body of a merged rule document.
pub const RULE_SEPARATOR: &str = "\n\n---\n\n";

/// Frontmatter key naming the stack a merged rule document was built for.
pub const STACK_KEY: &str = "stack";

/// Heading line opening the guidance section appended to the root rule document.
pub const GUIDANCE_HEADING: &str = "## Rulekit";

/// Directories never descended into when scanning a target for merged rule documents.
pub const SCAN_SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    "dist",
    "vendor",
    ".claude",
    ".cursor",
    ".github",
];

// ---------------------------------------------------------------------------
// 2. Source tree
// ---------------------------------------------------------------------------

pub const RULES_DIR: &str = "rules";
pub const PROMPTS_DIR: &str = "prompts";
pub const SKILLS_DIR: &str = "skills";

/// Extension of canonical prompt sources (`prompts/<stack>/<name>.md`).
pub const PROMPT_SOURCE_EXT: &str = ".md";

/// Required entry document of a skill directory.
pub const SKILL_ENTRY: &str = "SKILL.md";

// ---------------------------------------------------------------------------
// 3. Target tree
// ---------------------------------------------------------------------------

/// Prefix of every generated prompt file and of the derived `name` field.
pub const NAME_PREFIX: &str = "rulekit-";

pub const CURSOR_COMMANDS_DIR: &[&str] = &[".cursor", "commands"];
pub const CURSOR_COMMANDS_EXT: &str = ".md";

pub const COPILOT_PROMPTS_DIR: &[&str] = &[".github", "prompts"];
pub const COPILOT_PROMPTS_EXT: &str = ".prompt.md";

pub const CLAUDE_COMMANDS_DIR: &[&str] = &[".claude", "commands"];
pub const CLAUDE_COMMANDS_EXT: &str = ".md";

pub const SKILLS_TARGET_DIR: &[&str] = &[".claude", "skills"];

// ---------------------------------------------------------------------------
// 4. Prompt metadata
// ---------------------------------------------------------------------------

pub const NAME_KEY: &str = "name";
pub const DESCRIPTION_KEY: &str = "description";
pub const AGENT_KEY: &str = "agent";
pub const AGENT_VALUE: &str = "agent";

/// Fields the Claude command variant carries over from the source, in output order.
pub const CLAUDE_ALLOWED_KEYS: &[&str] = &["description", "allowed-tools", "argument-hint", "model"];

/// Fields injected by the generators that never flow back into canonical sources.
pub const CLIENT_INJECTED_KEYS: &[&str] = &[NAME_KEY, AGENT_KEY];

// ---------------------------------------------------------------------------
// 5. Environment file
// ---------------------------------------------------------------------------

pub const ENV_FILE: &str = ".env";
pub const ENV_STACK_VAR: &str = "RULEKIT_STACK";

// ---------------------------------------------------------------------------
// 6. Path helpers
// ---------------------------------------------------------------------------

/// Join a fixed multi-segment directory convention onto `root`.
pub fn join_segments(root: &Path, segments: &[&str]) -> PathBuf {
    segments.iter().fold(root.to_path_buf(), |p, s| p.join(s))
}

/// `<root>/.claude/skills`
pub fn skills_target_dir(root: &Path) -> PathBuf {
    join_segments(root, SKILLS_TARGET_DIR)
}

// ---------------------------------------------------------------------------
// 7. User settings
// ---------------------------------------------------------------------------

/// Contents of `~/.rulekit/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Local checkout of the template repository, used by `sync` and `diff`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// `owner/name` of the template repository, used by `push`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Base branch for pull requests; the remote default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    /// Directory of `*.tera` files replacing the embedded templates of the same name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<PathBuf>,
}

/// `<home>/.rulekit/config.yaml`: pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".rulekit").join("config.yaml")
}

impl Settings {
    /// Load settings from `<home>/.rulekit/config.yaml`.
    ///
    /// A missing file yields the defaults; a malformed one is
    /// [`CoreError::Settings`] with the path attached.
    pub fn load_at(home: &Path) -> Result<Self, CoreError> {
        let path = settings_path_at(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| CoreError::Settings { path, source: e })
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_at(&home()?)
    }

    /// The template checkout, preferring `flag` over the settings file.
    pub fn source_or(&self, flag: Option<PathBuf>, home: &Path) -> Result<PathBuf, CoreError> {
        flag.or_else(|| self.source.clone())
            .ok_or_else(|| CoreError::MissingSetting {
                key: "source",
                flag: "source",
                path: settings_path_at(home),
            })
    }

    /// The template repository, preferring `flag` over the settings file.
    pub fn repo_or(&self, flag: Option<String>, home: &Path) -> Result<String, CoreError> {
        flag.or_else(|| self.repo.clone())
            .ok_or_else(|| CoreError::MissingSetting {
                key: "repo",
                flag: "repo",
                path: settings_path_at(home),
            })
    }
}

/// The current user's home directory.
pub fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}
