//! Merged rule documents.
//!
//! Every directory that holds an `AGENTS.md` under `rules/common/` or
//! `rules/<stack>/` yields one merged document at the mirrored path in the
//! target. The root document additionally carries the rendered guidance
//! section.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rulekit_core::config::{RULES_DIR, RULE_FILE, STACK_KEY};
use rulekit_core::fs::{read_optional, walk_files};
use rulekit_core::{frontmatter, StackName};
use rulekit_renderer::{merge, GuidanceContext, TemplateEngine};

use crate::error::SyncError;
use crate::writer::PlannedFile;

/// `<source>/rules/<stack>`
pub fn stack_rules_dir(source: &Path, stack: &StackName) -> PathBuf {
    source.join(RULES_DIR).join(stack.as_str())
}

/// Relative directories holding a rule file in any of `stacks`, sorted.
/// The empty path stands for the stack root.
pub fn rule_dirs(source: &Path, stacks: &[&StackName]) -> Result<BTreeSet<PathBuf>, SyncError> {
    let mut dirs = BTreeSet::new();
    for stack in stacks {
        let root = stack_rules_dir(source, stack);
        for file in walk_files(&root, &[])? {
            if file.file_name().and_then(|n| n.to_str()) != Some(RULE_FILE) {
                continue;
            }
            let relative = file
                .parent()
                .and_then(|p| p.strip_prefix(&root).ok())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            dirs.insert(relative);
        }
    }
    Ok(dirs)
}

/// Body of `rules/<stack>/<dir>/AGENTS.md`, or `""` when absent.
pub fn read_rule_body(source: &Path, stack: &StackName, dir: &Path) -> Result<String, SyncError> {
    let path = stack_rules_dir(source, stack).join(dir).join(RULE_FILE);
    Ok(read_optional(&path)?
        .map(|raw| frontmatter::parse_lenient(&raw).body)
        .unwrap_or_default())
}

/// Plan every merged rule document for `stack`.
pub fn plan_rules(
    source: &Path,
    target: &Path,
    stack: &StackName,
    engine: &TemplateEngine,
) -> Result<Vec<PlannedFile>, SyncError> {
    let common = StackName::common();
    let layers: Vec<&StackName> = if stack.is_common() {
        vec![&common]
    } else {
        vec![&common, stack]
    };

    let metadata = frontmatter::metadata([(STACK_KEY, stack.as_str())]);
    let mut planned = Vec::new();
    for dir in rule_dirs(source, &layers)? {
        let common_body = read_rule_body(source, &common, &dir)?;
        let stack_body = if stack.is_common() {
            String::new()
        } else {
            read_rule_body(source, stack, &dir)?
        };

        let merged = merge::merge(&common_body, &stack_body);
        if merged.is_empty() {
            tracing::debug!("skipping empty rule document: {}", dir.display());
            continue;
        }

        let body = if dir.as_os_str().is_empty() {
            let guidance = engine.render_guidance(&GuidanceContext::new(stack.as_str()))?;
            merge::append_guidance(&merged, &guidance)
        } else {
            merged
        };

        let text = frontmatter::serialize(&body, &metadata)?;
        planned.push(PlannedFile::text(target.join(&dir).join(RULE_FILE), &text));
    }
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn text(file: &PlannedFile) -> String {
        String::from_utf8(file.contents.clone()).unwrap()
    }

    #[test]
    fn rule_dirs_unions_common_and_stack_only() {
        let src = TempDir::new().unwrap();
        write(src.path(), "rules/common/AGENTS.md", "# C");
        write(src.path(), "rules/vue/web/AGENTS.md", "# W");
        write(src.path(), "rules/react/app/AGENTS.md", "# R");
        write(src.path(), "rules/vue/web/notes.txt", "ignored");

        let vue = StackName::from("vue");
        let dirs = rule_dirs(src.path(), &[&StackName::common(), &vue]).unwrap();
        let dirs: Vec<_> = dirs.into_iter().collect();
        assert_eq!(dirs, vec![PathBuf::new(), PathBuf::from("web")]);
    }

    #[test]
    fn nested_document_has_no_guidance() {
        let src = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(src.path(), "rules/vue/web/AGENTS.md", "# Web\n");
        let engine = TemplateEngine::embedded().unwrap();

        let planned = plan_rules(src.path(), target.path(), &"vue".into(), &engine).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].path, target.path().join("web/AGENTS.md"));
        assert_eq!(text(&planned[0]), "---\nstack: vue\n---\n# Web\n");
    }

    #[test]
    fn root_document_ends_with_guidance() {
        let src = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(src.path(), "rules/common/AGENTS.md", "# Common\n");
        let engine = TemplateEngine::embedded().unwrap();

        let planned = plan_rules(src.path(), target.path(), &StackName::common(), &engine).unwrap();
        let doc = frontmatter::parse(&text(&planned[0])).unwrap();
        assert_eq!(doc.metadata.get_str("stack"), Some("common"));
        assert!(doc.body.starts_with("# Common\n\n## Rulekit\n"));
    }

    #[test]
    fn source_frontmatter_is_not_carried_into_the_merge() {
        let src = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(src.path(), "rules/common/api/AGENTS.md", "---\nowner: platform\n---\n# Api\n");
        let engine = TemplateEngine::embedded().unwrap();

        let planned = plan_rules(src.path(), target.path(), &StackName::common(), &engine).unwrap();
        assert_eq!(text(&planned[0]), "---\nstack: common\n---\n# Api\n");
    }

    #[test]
    fn blank_layers_produce_no_document() {
        let src = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(src.path(), "rules/common/empty/AGENTS.md", "\n\n");
        write(src.path(), "rules/vue/empty/AGENTS.md", "   \n");
        let engine = TemplateEngine::embedded().unwrap();

        let planned = plan_rules(src.path(), target.path(), &"vue".into(), &engine).unwrap();
        assert!(planned.is_empty());
    }
}
