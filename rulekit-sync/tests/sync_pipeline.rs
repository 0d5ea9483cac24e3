use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use rstest::rstest;
use rulekit_core::stack::{self, ResolvedStack, StackSource};
use rulekit_core::{frontmatter, Selection, StackName};
use rulekit_renderer::TemplateEngine;
use rulekit_sync::{pipeline, SyncOptions, WriteResult};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write fixture");
}

fn template_repo() -> TempDir {
    let source = TempDir::new().expect("source");
    write(source.path(), "rules/common/AGENTS.md", "# Common\n\nBe nice.\n");
    write(source.path(), "rules/vue-bootstrap/AGENTS.md", "# Vue Rules\n\nVue stuff.\n");
    write(source.path(), "rules/vue-bootstrap/web/AGENTS.md", "# Web\n");
    write(source.path(), "rules/react/AGENTS.md", "# React\n");
    write(source.path(), "prompts/common/code-review.md", "# Code Review\n\nReview the code.\n");
    write(source.path(), "prompts/vue-bootstrap/component.md", "---\nmodel: opus\n---\n# Component\n");
    write(source.path(), "skills/a11y/SKILL.md", "# Accessibility audit\n");
    write(source.path(), "skills/a11y/references/wcag.md", "WCAG 2.2\n");
    write(source.path(), "skills/unfinished/notes.md", "no entry document\n");
    source
}

fn options(source: &Path, target: &Path, stack: &str) -> SyncOptions {
    SyncOptions {
        source: source.to_path_buf(),
        target: target.to_path_buf(),
        stack: ResolvedStack {
            name: StackName::from(stack),
            source: StackSource::Explicit,
        },
        selection: Selection::all(),
        dry_run: false,
    }
}

fn mtime_of(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(path).expect("metadata"))
}

fn written_paths(writes: &[WriteResult], root: &Path) -> Vec<PathBuf> {
    writes
        .iter()
        .filter(|w| w.is_change())
        .map(|w| w.path().strip_prefix(root).expect("under target").to_path_buf())
        .collect()
}

#[test]
fn merged_rules_carry_both_layers_and_the_stack() {
    init_logging();
    let source = template_repo();
    let target = TempDir::new().expect("target");
    let engine = TemplateEngine::embedded().expect("engine");

    pipeline::run(&options(source.path(), target.path(), "vue-bootstrap"), &engine).expect("sync");

    let raw = fs::read_to_string(target.path().join("AGENTS.md")).expect("root rules");
    let doc = frontmatter::parse(&raw).expect("parse");
    assert_eq!(doc.metadata.get_str("stack"), Some("vue-bootstrap"));
    assert!(doc
        .body
        .starts_with("# Common\n\nBe nice.\n\n---\n\n# Vue Rules\n\nVue stuff.\n"));
    assert!(!doc.body.contains("# React"));

    let web = fs::read_to_string(target.path().join("web/AGENTS.md")).expect("nested rules");
    assert_eq!(web, "---\nstack: vue-bootstrap\n---\n# Web\n");
}

#[test]
fn synced_stack_is_picked_up_by_resolution() {
    let source = template_repo();
    let target = TempDir::new().expect("target");
    let engine = TemplateEngine::embedded().expect("engine");
    pipeline::run(&options(source.path(), target.path(), "vue-bootstrap"), &engine).expect("sync");

    let resolved = stack::resolve(None, target.path());
    assert_eq!(resolved.name.as_str(), "vue-bootstrap");
    assert_eq!(resolved.source, StackSource::SyncedDocument);
}

#[test]
fn full_sync_writes_every_output_once() {
    let source = template_repo();
    let target = TempDir::new().expect("target");
    let engine = TemplateEngine::embedded().expect("engine");

    let report =
        pipeline::run(&options(source.path(), target.path(), "vue-bootstrap"), &engine).expect("sync");

    let written = written_paths(&report.writes, target.path());
    let expected: Vec<PathBuf> = [
        "AGENTS.md",
        "web/AGENTS.md",
        ".github/prompts/rulekit-code-review.prompt.md",
        ".claude/commands/rulekit-code-review.md",
        ".cursor/commands/rulekit-code-review.md",
        ".github/prompts/rulekit-component.prompt.md",
        ".claude/commands/rulekit-component.md",
        ".cursor/commands/rulekit-component.md",
        ".claude/skills/a11y/SKILL.md",
        ".claude/skills/a11y/references/wcag.md",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(written, expected);
    assert!(!target.path().join(".claude/skills/unfinished").exists());
}

#[test]
fn second_sync_is_byte_identical_and_touches_nothing() {
    let source = template_repo();
    let target = TempDir::new().expect("target");
    let engine = TemplateEngine::embedded().expect("engine");
    let opts = options(source.path(), target.path(), "vue-bootstrap");

    let first = pipeline::run(&opts, &engine).expect("first sync");
    let snapshot: Vec<(PathBuf, Vec<u8>)> = first
        .writes
        .iter()
        .map(|w| (w.path().to_path_buf(), fs::read(w.path()).expect("read output")))
        .collect();

    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(24 * 60 * 60));
    let mut mtimes = Vec::new();
    for (path, _) in &snapshot {
        set_file_mtime(path, old).expect("set old mtime");
        mtimes.push(mtime_of(path));
    }

    let second = pipeline::run(&opts, &engine).expect("second sync");
    assert_eq!(second.changed(), 0);
    for ((path, bytes), before) in snapshot.iter().zip(mtimes) {
        assert_eq!(&fs::read(path).expect("reread"), bytes);
        assert_eq!(mtime_of(path), before, "{} was rewritten", path.display());
    }
}

#[test]
fn dry_run_reports_without_writing() {
    let source = template_repo();
    let target = TempDir::new().expect("target");
    let engine = TemplateEngine::embedded().expect("engine");
    let mut opts = options(source.path(), target.path(), "common");
    opts.dry_run = true;

    let report = pipeline::run(&opts, &engine).expect("dry run");
    assert!(report.dry_run);
    assert!(!report.writes.is_empty());
    assert!(report
        .writes
        .iter()
        .all(|w| matches!(w, WriteResult::WouldWrite { .. })));
    assert_eq!(fs::read_dir(target.path()).expect("read target").count(), 0);
}

#[test]
fn empty_layers_write_no_rule_file() {
    let source = TempDir::new().expect("source");
    let target = TempDir::new().expect("target");
    write(source.path(), "rules/common/docs/AGENTS.md", "\n");
    let engine = TemplateEngine::embedded().expect("engine");

    let report = pipeline::run(&options(source.path(), target.path(), "common"), &engine).expect("sync");
    assert!(report.writes.is_empty());
    assert!(!target.path().join("docs").exists());
}

#[rstest]
#[case::rules_only(Selection::from_flags(true, false, false), 1)]
#[case::prompts_only(Selection::from_flags(false, true, false), 3)]
#[case::skills_only(Selection::from_flags(false, false, true), 2)]
#[case::everything(Selection::all(), 6)]
fn selection_flags_limit_the_run(#[case] selection: Selection, #[case] expected: usize) {
    let source = template_repo();
    let target = TempDir::new().expect("target");
    let engine = TemplateEngine::embedded().expect("engine");
    let mut opts = options(source.path(), target.path(), "common");
    opts.selection = selection;

    let report = pipeline::run(&opts, &engine).expect("sync");
    assert_eq!(report.writes.len(), expected);
}

#[test]
fn report_serializes_to_json() {
    let source = template_repo();
    let target = TempDir::new().expect("target");
    let engine = TemplateEngine::embedded().expect("engine");
    let mut opts = options(source.path(), target.path(), "react");
    opts.selection = Selection::from_flags(true, false, false);

    let report = pipeline::run(&opts, &engine).expect("sync");
    let json: serde_json::Value = serde_json::from_str(&report.to_json().expect("json")).expect("parse");
    assert_eq!(json["stack"], "react");
    assert_eq!(json["stack_source"], "command line");
    assert_eq!(json["writes"][0]["status"], "written");
}
