//! Atomic writer.
//!
//! ## `atomic_write` protocol
//!
//! 1. Content is rendered by the caller into a [`PlannedFile`].
//! 2. Compare with the bytes already on disk; skip if identical.
//! 3. In dry-run mode, report what would be written and stop.
//! 4. Create parent directories, write `<path>.rulekit.tmp`.
//! 5. Rename to the final path (atomic on POSIX).

use std::path::{Path, PathBuf};

use serde::Serialize;

use rulekit_core::fs::read_optional_bytes;

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Planned file
// ---------------------------------------------------------------------------

/// One file sync intends to produce, fully rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl PlannedFile {
    /// Rendered text, with line endings normalised to LF.
    pub fn text(path: PathBuf, contents: &str) -> Self {
        Self {
            path,
            contents: contents.replace("\r\n", "\n").into_bytes(),
        }
    }

    /// Opaque bytes, written verbatim (skill assets).
    pub fn bytes(path: PathBuf, contents: Vec<u8>) -> Self {
        Self { path, contents }
    }
}

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; identical content is already on disk.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Atomically write a single planned file.
pub fn atomic_write(file: &PlannedFile, dry_run: bool) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.rulekit.tmp", file.path.display()));
    atomic_write_with_tmp(file, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    file: &PlannedFile,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    let path = file.path.as_path();

    if read_optional_bytes(path)?.as_deref() == Some(file.contents.as_slice()) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, &file.contents).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sync_text(path: &Path, text: &str) -> WriteResult {
        atomic_write(&PlannedFile::text(path.to_path_buf(), text), false).unwrap()
    }

    #[test]
    fn missing_rule_document_is_written() {
        let project = TempDir::new().unwrap();
        let agents = project.path().join("AGENTS.md");
        assert!(matches!(sync_text(&agents, "# Common\n"), WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&agents).unwrap(), "# Common\n");
    }

    #[test]
    fn identical_bytes_are_left_alone() {
        let project = TempDir::new().unwrap();
        let agents = project.path().join("AGENTS.md");
        sync_text(&agents, "# Common\n");
        let again = sync_text(&agents, "# Common\n");
        assert!(matches!(again, WriteResult::Unchanged { .. }));
        assert!(!again.is_change());
    }

    #[test]
    fn new_template_content_replaces_old() {
        let project = TempDir::new().unwrap();
        let agents = project.path().join("AGENTS.md");
        sync_text(&agents, "# Common\n\nv1\n");
        let outcome = sync_text(&agents, "# Common\n\nv2\n");
        assert!(matches!(outcome, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&agents).unwrap(), "# Common\n\nv2\n");
    }

    #[test]
    fn hand_edits_are_overwritten() {
        let project = TempDir::new().unwrap();
        let command = project.path().join("rulekit-review.md");
        sync_text(&command, "# Review\n");
        fs::write(&command, "# Review, tweaked locally\n").unwrap();
        assert!(sync_text(&command, "# Review\n").is_change());
        assert_eq!(fs::read_to_string(&command).unwrap(), "# Review\n");
    }

    #[test]
    fn dry_run_plans_without_touching_disk() {
        let project = TempDir::new().unwrap();
        let skill = project.path().join(".claude/skills/a11y/SKILL.md");
        let outcome = atomic_write(&PlannedFile::text(skill.clone(), "# A11y\n"), true).unwrap();
        assert!(matches!(outcome, WriteResult::WouldWrite { .. }));
        assert!(!skill.exists());
        assert!(!project.path().join(".claude").exists());
    }

    #[test]
    fn dry_run_still_detects_unchanged_files() {
        let project = TempDir::new().unwrap();
        let agents = project.path().join("AGENTS.md");
        sync_text(&agents, "# Common\n");
        let outcome = atomic_write(&PlannedFile::text(agents, "# Common\n"), true).unwrap();
        assert!(matches!(outcome, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn no_sibling_tmp_survives_a_write() {
        let project = TempDir::new().unwrap();
        let agents = project.path().join("AGENTS.md");
        sync_text(&agents, "# Common\n");
        let sibling = PathBuf::from(format!("{}.rulekit.tmp", agents.display()));
        assert!(!sibling.exists());
    }

    #[test]
    fn nested_prompt_dirs_are_created() {
        let project = TempDir::new().unwrap();
        let prompt = project.path().join(".github/prompts/rulekit-review.prompt.md");
        sync_text(&prompt, "---\nname: rulekit-review\n---\n# Review\n");
        assert!(prompt.is_file());
    }

    #[test]
    fn line_endings_do_not_count_as_a_change() {
        let project = TempDir::new().unwrap();
        let agents = project.path().join("AGENTS.md");

        assert!(sync_text(&agents, "# Common\r\n\r\nBe nice.\r\n").is_change());
        let outcome = sync_text(&agents, "# Common\n\nBe nice.\n");
        assert!(matches!(outcome, WriteResult::Unchanged { .. }));
        assert_eq!(fs::read_to_string(&agents).unwrap(), "# Common\n\nBe nice.\n");
    }

    #[test]
    fn skill_assets_keep_their_bytes() {
        let project = TempDir::new().unwrap();
        let asset = project.path().join("diagram.png");
        let raw = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x00];
        atomic_write(&PlannedFile::bytes(asset.clone(), raw.clone()), false).unwrap();
        assert_eq!(fs::read(&asset).unwrap(), raw);
    }

    #[test]
    fn write_result_serializes_with_status_tag() {
        let json = serde_json::to_string(&WriteResult::WouldWrite {
            path: PathBuf::from("AGENTS.md"),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"would_write","path":"AGENTS.md"}"#);
    }

    #[test]
    #[cfg(unix)]
    fn failed_rename_keeps_previous_sync_and_removes_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let project = TempDir::new().unwrap();
        let locked = project.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        let agents = locked.join("AGENTS.md");
        fs::write(&agents, "# Previous sync\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind a privileged user.
        if fs::write(locked.join("probe"), "").is_ok() {
            return;
        }

        let scratch = TempDir::new().unwrap();
        let tmp = scratch.path().join("AGENTS.md.rulekit.tmp");
        let file = PlannedFile::text(agents.clone(), "# Next sync\n");
        assert!(atomic_write_with_tmp(&file, false, &tmp).is_err());

        assert_eq!(fs::read_to_string(&agents).unwrap(), "# Previous sync\n");
        assert!(!tmp.exists());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
