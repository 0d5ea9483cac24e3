//! Skill directories, copied verbatim into `.claude/skills/`.

use std::path::Path;

use rulekit_core::config::{skills_target_dir, SKILLS_DIR};
use rulekit_core::fs::{read_tree, skill_dirs};

use crate::error::SyncError;
use crate::writer::PlannedFile;

/// Plan a byte-for-byte copy of every source skill into the target.
pub fn plan_skills(source: &Path, target: &Path) -> Result<Vec<PlannedFile>, SyncError> {
    let dest_root = skills_target_dir(target);
    let mut planned = Vec::new();
    for (name, dir) in skill_dirs(&source.join(SKILLS_DIR))? {
        for (relative, bytes) in read_tree(&dir)? {
            planned.push(PlannedFile::bytes(dest_root.join(&name).join(relative), bytes));
        }
    }
    Ok(planned)
}
