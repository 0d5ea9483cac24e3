//! Domain types shared by every rulekit crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::config::COMMON_STACK;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A named layer of rules and prompts (e.g. `vue-bootstrap`).
///
/// `common` is reserved for the universal base layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StackName(pub String);

impl StackName {
    /// The reserved base layer.
    pub fn common() -> Self {
        Self(COMMON_STACK.to_owned())
    }

    pub fn is_common(&self) -> bool {
        self.0 == COMMON_STACK
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StackName {
    fn default() -> Self {
        Self::common()
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for StackName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StackName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which kinds of content a sync or push touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub rules: bool,
    pub prompts: bool,
    pub skills: bool,
}

impl Selection {
    pub fn all() -> Self {
        Self {
            rules: true,
            prompts: true,
            skills: true,
        }
    }

    /// Build from command-line flags; no flag at all means everything.
    pub fn from_flags(rules: bool, prompts: bool, skills: bool) -> Self {
        if !(rules || prompts || skills) {
            return Self::all();
        }
        Self {
            rules,
            prompts,
            skills,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Ordered frontmatter of a document.
///
/// Keys are strings; values are usually strings but any YAML value read from
/// disk is kept as-is so unknown fields survive a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(pub Mapping);

impl Metadata {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The value for `key` if it is present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Scalar values rendered as text; sequences and mappings yield `None`.
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a string value; an existing key keeps its position.
    pub fn insert_str(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .insert(Value::String(key.to_owned()), Value::String(value.into()));
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        self.0.insert(key, value);
    }

    /// Remove `key`, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.0.get(key).cloned()?;
        self.0 = std::mem::take(&mut self.0)
            .into_iter()
            .filter(|(k, _)| k.as_str() != Some(key))
            .collect();
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.iter()
    }

    /// Copy with every key in `keys` removed.
    pub fn without(&self, keys: &[&str]) -> Self {
        let mut out = self.clone();
        for key in keys {
            out.remove(key);
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut md = Metadata::new();
        for (k, v) in iter {
            md.insert_str(&k.into(), v);
        }
        md
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A Markdown document: optional frontmatter plus a free-text body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub metadata: Metadata,
    pub body: String,
}

impl Document {
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }

    /// A document with no frontmatter.
    pub fn plain(body: impl Into<String>) -> Self {
        Self::new(Metadata::new(), body)
    }

    /// Text of the first non-blank line when it is a level-one Markdown heading.
    pub fn heading(&self) -> Option<&str> {
        let first = self.body.trim_start().lines().next()?;
        let title = first.strip_prefix("# ")?.trim();
        (!title.is_empty()).then_some(title)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_name_display_and_common() {
        assert_eq!(StackName::from("vue-bootstrap").to_string(), "vue-bootstrap");
        assert!(StackName::common().is_common());
        assert!(!StackName::from("react").is_common());
        assert_eq!(StackName::default(), StackName::common());
    }

    #[test]
    fn selection_without_flags_is_everything() {
        assert_eq!(Selection::from_flags(false, false, false), Selection::all());
        let only_rules = Selection::from_flags(true, false, false);
        assert!(only_rules.rules && !only_rules.prompts && !only_rules.skills);
    }

    #[test]
    fn metadata_keeps_insertion_order() {
        let md: Metadata = [("name", "a"), ("description", "b"), ("agent", "c")]
            .into_iter()
            .collect();
        let keys: Vec<_> = md.iter().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "description", "agent"]);
    }

    #[test]
    fn metadata_overwrite_keeps_position() {
        let mut md: Metadata = [("model", "x"), ("description", "old")].into_iter().collect();
        md.insert_str("model", "y");
        let keys: Vec<_> = md.iter().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["model", "description"]);
        assert_eq!(md.get_str("model"), Some("y"));
    }

    #[test]
    fn metadata_without_drops_listed_keys() {
        let md: Metadata = [("name", "n"), ("agent", "agent"), ("model", "m")]
            .into_iter()
            .collect();
        let stripped = md.without(&["name", "agent"]);
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped.get_str("model"), Some("m"));
    }

    #[test]
    fn get_text_renders_scalars() {
        let mut md = Metadata::new();
        md.insert(Value::from("count"), Value::from(3));
        md.insert(Value::from("flag"), Value::from(true));
        assert_eq!(md.get_text("count").as_deref(), Some("3"));
        assert_eq!(md.get_text("flag").as_deref(), Some("true"));
        assert!(md.get_str("count").is_none());
    }

    #[test]
    fn heading_requires_hash_space_on_first_line() {
        assert_eq!(Document::plain("# Code Review\n\nbody").heading(), Some("Code Review"));
        assert_eq!(Document::plain("\n\n# Spaced\n").heading(), Some("Spaced"));
        assert_eq!(Document::plain("## Sub\n").heading(), None);
        assert_eq!(Document::plain("#NoSpace\n").heading(), None);
        assert_eq!(Document::plain("Intro\n# Later\n").heading(), None);
        assert_eq!(Document::plain("").heading(), None);
    }
}
