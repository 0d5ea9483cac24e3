//! Filesystem helpers shared by sync and push.
//!
//! All listings are sorted so that every caller sees a deterministic order.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::SKILL_ENTRY;
use crate::error::{io_err, CoreError};

/// Read `path` as UTF-8, mapping "not found" to `None`.
pub fn read_optional(path: &Path) -> Result<Option<String>, CoreError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Read `path` as bytes, mapping "not found" to `None`.
pub fn read_optional_bytes(path: &Path) -> Result<Option<Vec<u8>>, CoreError> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Immediate subdirectories of `dir`, sorted by name. Missing `dir` is empty.
pub fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    list_entries(dir, true)
}

/// Immediate regular files of `dir`, sorted by name. Missing `dir` is empty.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    list_entries(dir, false)
}

fn list_entries(dir: &Path, want_dirs: bool) -> Result<Vec<PathBuf>, CoreError> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if (want_dirs && file_type.is_dir()) || (!want_dirs && file_type.is_file()) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Every regular file below `dir`, sorted. Directory names listed in `skip`
/// are not descended into. Missing `dir` is empty.
pub fn walk_files(dir: &Path, skip: &[&str]) -> Result<Vec<PathBuf>, CoreError> {
    let mut out = Vec::new();
    if dir.is_dir() {
        collect_files(dir, skip, &mut out)?;
    }
    out.sort();
    Ok(out)
}

fn collect_files(dir: &Path, skip: &[&str], out: &mut Vec<PathBuf>) -> Result<(), CoreError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            let name = entry.file_name();
            if skip.iter().any(|s| name.to_str() == Some(s)) {
                continue;
            }
            collect_files(&path, skip, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Skill directories directly below `skills_root` that contain the entry
/// document, as `(name, path)` pairs sorted by name.
pub fn skill_dirs(skills_root: &Path) -> Result<Vec<(String, PathBuf)>, CoreError> {
    let mut out = Vec::new();
    for dir in list_dirs(skills_root)? {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };
        if !dir.join(SKILL_ENTRY).is_file() {
            tracing::debug!(dir = %dir.display(), "skipping directory without {SKILL_ENTRY}");
            continue;
        }
        out.push((name, dir));
    }
    Ok(out)
}

/// `(relative_path, bytes)` for every file below `dir`, sorted by path.
pub fn read_tree(dir: &Path) -> Result<Vec<(PathBuf, Vec<u8>)>, CoreError> {
    let mut out = Vec::new();
    for path in walk_files(dir, &[])? {
        let bytes = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
        let relative = path.strip_prefix(dir).unwrap_or(&path).to_path_buf();
        out.push((relative, bytes));
    }
    Ok(out)
}

/// Copy every file below `from` into the mirrored location below `to`,
/// writing only files whose bytes differ. Returns the destination paths
/// that were written.
pub fn copy_tree(from: &Path, to: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut written = Vec::new();
    for (relative, bytes) in read_tree(from)? {
        let dest = to.join(&relative);
        if read_optional_bytes(&dest)?.as_deref() == Some(bytes.as_slice()) {
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(&dest, &bytes).map_err(|e| io_err(&dest, e))?;
        written.push(dest);
    }
    Ok(written)
}

/// `path` relative to `root` with `/` separators, for display and keys.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
