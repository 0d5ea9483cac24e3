//! Prompt write-back into `prompts/<stack>/<name>.md` of the scratch clone.

use std::path::Path;

use serde::Serialize;

use rulekit_core::config::{
    CLAUDE_ALLOWED_KEYS, CLIENT_INJECTED_KEYS, DESCRIPTION_KEY, PROMPTS_DIR, PROMPT_SOURCE_EXT,
};
use rulekit_core::fs::{list_dirs, read_optional};
use rulekit_core::{frontmatter, Document, StackName};
use rulekit_renderer::formats::derive_description;
use rulekit_renderer::PromptFormat;

use crate::collector::{canonical_form, Collected, CollectedPrompt};
use crate::error::{io_err, PushError};

/// Logical prompt names touched by a push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromptChanges {
    pub updated: Vec<String>,
    pub created: Vec<String>,
}

/// Whether `format` carries `key` through from the canonical source.
fn carries(format: PromptFormat, key: &str) -> bool {
    match format {
        PromptFormat::Copilot => true,
        PromptFormat::Claude => CLAUDE_ALLOWED_KEYS.contains(&key),
        PromptFormat::Cursor => false,
    }
}

/// A local `description` the generators would have produced themselves:
/// the heading of the local body, or of the canonical body it was synced from.
fn has_generated_description(local: &Document, existing: &Document, name: &str) -> bool {
    let Some(description) = local.metadata.get_text(DESCRIPTION_KEY) else {
        return false;
    };
    description == derive_description(local, name) || description == derive_description(existing, name)
}

/// The local document with the canonical fields its format cannot show
/// restored from `existing`.
///
/// Fields present locally are kept as written. A generated `description`
/// gives way to the canonical one, or is dropped when there is none.
fn with_dropped_fields(prompt: &CollectedPrompt, existing: &Document, name: &str) -> Document {
    let mut doc = prompt.document.clone();
    if has_generated_description(&doc, existing, name) {
        match existing.metadata.get(DESCRIPTION_KEY) {
            Some(value) => doc.metadata.insert(DESCRIPTION_KEY.into(), value.clone()),
            None => {
                doc.metadata.remove(DESCRIPTION_KEY);
            }
        }
    }
    for (key, value) in existing.metadata.iter() {
        let Some(field) = key.as_str() else {
            continue;
        };
        if carries(prompt.format, field)
            || CLIENT_INJECTED_KEYS.contains(&field)
            || doc.metadata.contains_key(field)
        {
            continue;
        }
        doc.metadata.insert(key.clone(), value.clone());
    }
    doc
}

/// Canonical form for change detection.
///
/// A `description` equal to what the generators would derive anyway (the
/// body heading, or the logical name) counts as absent.
fn comparable(doc: &Document, name: &str) -> Document {
    let mut canonical = canonical_form(doc);
    let derived = derive_description(&canonical, name);
    if canonical.metadata.get_text(DESCRIPTION_KEY).as_deref() == Some(derived.as_str()) {
        canonical.metadata.remove(DESCRIPTION_KEY);
    }
    canonical
}

fn write_document(path: &Path, doc: &Document) -> Result<(), PushError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let text = frontmatter::to_markdown(doc)?;
    std::fs::write(path, text).map_err(|e| io_err(path, e))
}

/// Write every collected prompt back into `scratch`.
///
/// A prompt is updated in every stack directory that already holds a file of
/// the same name; a prompt found nowhere is created under `prompt_stack`.
pub fn push_prompts(
    scratch: &Path,
    collected: &Collected,
    prompt_stack: &StackName,
) -> Result<PromptChanges, PushError> {
    let stack_dirs = list_dirs(&scratch.join(PROMPTS_DIR))?;
    let mut changes = PromptChanges::default();

    for (name, prompt) in &collected.prompts {
        let file_name = format!("{name}{PROMPT_SOURCE_EXT}");
        let mut found = false;
        let mut updated = false;

        for dir in &stack_dirs {
            let path = dir.join(&file_name);
            let Some(raw) = read_optional(&path)? else {
                continue;
            };
            found = true;
            let existing = frontmatter::parse_lenient(&raw);
            let local = with_dropped_fields(prompt, &existing, name);
            if comparable(&local, name) == comparable(&existing, name) {
                tracing::debug!(prompt = %name, path = %path.display(), "unchanged");
                continue;
            }
            write_document(&path, &local)?;
            tracing::info!(prompt = %name, path = %path.display(), "updated prompt");
            updated = true;
        }

        if updated {
            changes.updated.push(name.clone());
        }
        if !found {
            let path = scratch
                .join(PROMPTS_DIR)
                .join(prompt_stack.as_str())
                .join(&file_name);
            write_document(&path, &with_dropped_fields(prompt, &Document::default(), name))?;
            tracing::info!(prompt = %name, path = %path.display(), "created prompt");
            changes.created.push(name.clone());
        }
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collected(name: &str, format: PromptFormat, raw: &str) -> Collected {
        let mut c = Collected::default();
        c.prompts.insert(
            name.to_owned(),
            CollectedPrompt {
                format,
                document: canonical_form(&frontmatter::parse(raw).unwrap()),
            },
        );
        c
    }

    fn seed(scratch: &Path, rel: &str, content: &str) {
        let path = scratch.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn derived_description_is_not_a_change() {
        let scratch = TempDir::new().unwrap();
        seed(scratch.path(), "prompts/common/review.md", "# Review\n\nLook closely.\n");
        let local = collected(
            "review",
            PromptFormat::Copilot,
            "---\nname: rulekit-review\ndescription: Review\nagent: agent\n---\n# Review\n\nLook closely.\n",
        );

        let changes = push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        assert_eq!(changes, PromptChanges::default());
    }

    #[test]
    fn custom_fields_round_trip_without_injected_keys() {
        let scratch = TempDir::new().unwrap();
        seed(scratch.path(), "prompts/vue/review.md", "---\ncolor: blue\n---\n# Review\n\nold\n");
        let local = collected(
            "review",
            PromptFormat::Copilot,
            "---\nname: rulekit-review\ndescription: Review\nagent: agent\ncolor: blue\nx-team: web\n---\n# Review\n\nnew\n",
        );

        let changes = push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        assert_eq!(changes.updated, vec!["review".to_string()]);

        let written = fs::read_to_string(scratch.path().join("prompts/vue/review.md")).unwrap();
        let doc = frontmatter::parse(&written).unwrap();
        assert!(!doc.metadata.contains_key("name"));
        assert!(!doc.metadata.contains_key("agent"));
        assert_eq!(doc.metadata.get_str("color"), Some("blue"));
        assert_eq!(doc.metadata.get_str("x-team"), Some("web"));
        assert!(!doc.metadata.contains_key("description"));
        assert_eq!(doc.body, "# Review\n\nnew\n");
    }

    #[test]
    fn copilot_edit_keeps_canonical_description() {
        let scratch = TempDir::new().unwrap();
        seed(
            scratch.path(),
            "prompts/common/review.md",
            "---\ndescription: Careful review\nmodel: opus\n---\n# Review\n\nold\n",
        );
        let local = collected(
            "review",
            PromptFormat::Copilot,
            "---\nname: rulekit-review\ndescription: Review\nagent: agent\nmodel: opus\n---\n# Review\n\nnew\n",
        );

        push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        assert_eq!(
            fs::read_to_string(scratch.path().join("prompts/common/review.md")).unwrap(),
            "---\ndescription: Careful review\nmodel: opus\n---\n# Review\n\nnew\n"
        );
    }

    #[test]
    fn field_added_in_claude_copy_survives() {
        let scratch = TempDir::new().unwrap();
        seed(scratch.path(), "prompts/common/fix.md", "# Fix\n\nold\n");
        let local = collected(
            "fix",
            PromptFormat::Claude,
            "---\ndescription: Fix\ncolor: red\n---\n# Fix\n\nnew\n",
        );

        push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        assert_eq!(
            fs::read_to_string(scratch.path().join("prompts/common/fix.md")).unwrap(),
            "---\ncolor: red\n---\n# Fix\n\nnew\n"
        );
    }

    #[test]
    fn description_written_in_copilot_copy_is_pushed() {
        let scratch = TempDir::new().unwrap();
        seed(scratch.path(), "prompts/common/fix.md", "# Fix\n\nold\n");
        let local = collected(
            "fix",
            PromptFormat::Copilot,
            "---\nname: rulekit-fix\ndescription: Fix flaky tests carefully\nagent: agent\n---\n# Fix\n\nold\n",
        );

        let changes = push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        assert_eq!(changes.updated, vec!["fix".to_string()]);
        assert_eq!(
            fs::read_to_string(scratch.path().join("prompts/common/fix.md")).unwrap(),
            "---\ndescription: Fix flaky tests carefully\n---\n# Fix\n\nold\n"
        );
    }

    #[test]
    fn field_edited_in_copilot_copy_is_pushed() {
        let scratch = TempDir::new().unwrap();
        seed(scratch.path(), "prompts/vue/review.md", "---\ncolor: blue\n---\n# Review\n\nbody\n");
        let local = collected(
            "review",
            PromptFormat::Copilot,
            "---\nname: rulekit-review\ndescription: Review\nagent: agent\ncolor: green\n---\n# Review\n\nbody\n",
        );

        let changes = push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        assert_eq!(changes.updated, vec!["review".to_string()]);
        assert_eq!(
            fs::read_to_string(scratch.path().join("prompts/vue/review.md")).unwrap(),
            "---\ncolor: green\n---\n# Review\n\nbody\n"
        );
    }

    #[test]
    fn heading_edit_in_copilot_copy_does_not_pin_old_description() {
        let scratch = TempDir::new().unwrap();
        seed(scratch.path(), "prompts/common/fix.md", "# Fix\n\nbody\n");
        let local = collected(
            "fix",
            PromptFormat::Copilot,
            "---\nname: rulekit-fix\ndescription: Fix\nagent: agent\n---\n# Fix tests\n\nbody\n",
        );

        push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        assert_eq!(
            fs::read_to_string(scratch.path().join("prompts/common/fix.md")).unwrap(),
            "# Fix tests\n\nbody\n"
        );
    }

    #[test]
    fn cursor_edit_keeps_canonical_fields() {
        let scratch = TempDir::new().unwrap();
        seed(scratch.path(), "prompts/common/fix.md", "---\nmodel: opus\ncolor: red\n---\n# Fix\n\nold\n");
        let local = collected("fix", PromptFormat::Cursor, "# Fix\n\nnew\n");

        push_prompts(scratch.path(), &local, &StackName::common()).unwrap();
        let doc = frontmatter::parse(
            &fs::read_to_string(scratch.path().join("prompts/common/fix.md")).unwrap(),
        )
        .unwrap();
        assert_eq!(doc.metadata.get_str("model"), Some("opus"));
        assert_eq!(doc.metadata.get_str("color"), Some("red"));
        assert_eq!(doc.body, "# Fix\n\nnew\n");
    }

    #[test]
    fn unknown_prompt_is_created_under_prompt_stack() {
        let scratch = TempDir::new().unwrap();
        fs::create_dir_all(scratch.path().join("prompts/common")).unwrap();
        let local = collected("deploy", PromptFormat::Cursor, "# Deploy\n");

        let changes = push_prompts(scratch.path(), &local, &StackName::from("nuxt")).unwrap();
        assert_eq!(changes.created, vec!["deploy".to_string()]);
        assert_eq!(
            fs::read_to_string(scratch.path().join("prompts/nuxt/deploy.md")).unwrap(),
            "# Deploy\n"
        );
    }
}
