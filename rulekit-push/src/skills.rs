//! Skill write-back: mirror `.claude/skills/<name>/` into `skills/<name>/`.

use std::path::Path;

use rulekit_core::config::{skills_target_dir, SKILLS_DIR};
use rulekit_core::fs::{copy_tree, skill_dirs};

use crate::error::PushError;

/// Copy every local skill into `scratch`, file by file, skipping files whose
/// bytes already match. Returns the names of skills with at least one write.
pub fn push_skills(target: &Path, scratch: &Path) -> Result<Vec<String>, PushError> {
    let mut changed = Vec::new();
    for (name, dir) in skill_dirs(&skills_target_dir(target))? {
        let written = copy_tree(&dir, &scratch.join(SKILLS_DIR).join(&name))?;
        if written.is_empty() {
            tracing::debug!(skill = %name, "unchanged");
            continue;
        }
        tracing::info!(skill = %name, files = written.len(), "updated skill");
        changed.push(name);
    }
    Ok(changed)
}
