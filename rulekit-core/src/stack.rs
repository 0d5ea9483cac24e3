//! Stack resolution.
//!
//! Priority, highest first:
//! 1. an explicitly supplied stack (command-line flag)
//! 2. `RULEKIT_STACK` in `<target>/.env`
//! 3. the `stack:` frontmatter of a previously synced `<target>/AGENTS.md`,
//!    unless it is `common`
//! 4. `common`
//!
//! Unreadable or unparsable inputs at levels 2 and 3 are "no signal" and fall
//! through to the next level.

use std::fmt;
use std::path::Path;

use crate::config::{ENV_FILE, ENV_STACK_VAR, RULE_FILE, STACK_KEY};
use crate::frontmatter;
use crate::types::StackName;

/// Where a resolved stack came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSource {
    Explicit,
    EnvFile,
    SyncedDocument,
    Default,
}

impl fmt::Display for StackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackSource::Explicit => write!(f, "command line"),
            StackSource::EnvFile => write!(f, "{ENV_FILE}"),
            StackSource::SyncedDocument => write!(f, "{RULE_FILE}"),
            StackSource::Default => write!(f, "default"),
        }
    }
}

/// A stack together with the level of the priority chain that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStack {
    pub name: StackName,
    pub source: StackSource,
}

impl ResolvedStack {
    pub fn is_explicit(&self) -> bool {
        self.source == StackSource::Explicit
    }
}

/// Resolve the stack for the project at `target_root`.
pub fn resolve(explicit: Option<&str>, target_root: &Path) -> ResolvedStack {
    if let Some(name) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return ResolvedStack {
            name: StackName::from(name),
            source: StackSource::Explicit,
        };
    }
    if let Some(name) = read_env_stack(target_root) {
        return ResolvedStack {
            name,
            source: StackSource::EnvFile,
        };
    }
    if let Some(name) = read_synced_stack(target_root) {
        return ResolvedStack {
            name,
            source: StackSource::SyncedDocument,
        };
    }
    ResolvedStack {
        name: StackName::common(),
        source: StackSource::Default,
    }
}

/// `RULEKIT_STACK` from `<target>/.env`, if set to a non-empty value.
pub fn read_env_stack(target_root: &Path) -> Option<StackName> {
    let contents = std::fs::read_to_string(target_root.join(ENV_FILE)).ok()?;
    parse_env_value(&contents, ENV_STACK_VAR).map(StackName::from)
}

/// The `stack:` field of `<target>/AGENTS.md`, ignoring `common`.
pub fn read_synced_stack(target_root: &Path) -> Option<StackName> {
    let raw = std::fs::read_to_string(target_root.join(RULE_FILE)).ok()?;
    let doc = frontmatter::parse(&raw).ok()?;
    let name = doc.metadata.get_text(STACK_KEY)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let stack = StackName::from(name);
    (!stack.is_common()).then_some(stack)
}

/// Look up `key` in dotenv-style `contents`.
///
/// Tolerates `export ` prefixes, whitespace around `=`, single or double
/// quotes, and `#` comment lines. The last assignment wins.
pub fn parse_env_value(contents: &str, key: &str) -> Option<String> {
    let mut found = None;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if k.trim() != key {
            continue;
        }
        let value = unquote(v.trim()).trim();
        found = (!value.is_empty()).then(|| value.to_owned());
    }
    found
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
