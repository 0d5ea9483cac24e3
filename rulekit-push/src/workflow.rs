//! Push workflow.
//!
//! ```text
//! ensure_ready → confirm (common stack only) → clone → branch
//!   → rules / prompts / skills write-back
//!   → if anything changed: commit → push → open PR
//!   → scratch clone removed (always)
//! ```
//!
//! The scratch clone lives in a [`tempfile::TempDir`], so it is removed on
//! every return path, including errors.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use rulekit_core::stack::ResolvedStack;
use rulekit_core::{Selection, StackName};
use rulekit_renderer::{PullRequestContext, TemplateEngine};

use crate::collector::{self, Conflict};
use crate::error::{io_err, PushError};
use crate::vcs::{PullRequest, VersionControl};
use crate::{prompts, rules, skills};

/// Asks the user a yes/no question.
pub trait Prompter {
    fn confirm(&self, message: &str) -> Result<bool, PushError>;
}

/// Inputs for one push.
#[derive(Debug, Clone)]
pub struct PushOptions {
    /// Root of the consuming project.
    pub target: PathBuf,
    /// `owner/name` of the template repository.
    pub repo: String,
    pub base_branch: Option<String>,
    pub stack: ResolvedStack,
    /// Stack directory for prompts that exist nowhere in the template yet.
    pub prompt_stack: Option<StackName>,
    pub selection: Selection,
    /// Answer the confirmation prompt with yes.
    pub assume_yes: bool,
}

/// Outcome of a push.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushReport {
    pub stack: StackName,
    pub branch: Option<String>,
    /// Canonical rule files written, relative to the template root.
    pub rules: Vec<String>,
    pub prompts_updated: Vec<String>,
    pub prompts_created: Vec<String>,
    pub skills: Vec<String>,
    pub conflicts: Vec<Conflict>,
    pub pr_url: Option<String>,
}

impl PushReport {
    pub fn has_changes(&self) -> bool {
        self.pr_url.is_some()
            || !self.rules.is_empty()
            || !self.prompts_updated.is_empty()
            || !self.prompts_created.is_empty()
            || !self.skills.is_empty()
    }
}

pub const CONFIRM_COMMON: &str =
    "No stack was given, so changes will go to the common layer shared by every project. Continue?";

/// `rulekit/<stack>-<yyyymmdd-HHMMSS>` in UTC.
pub fn branch_name(stack: &StackName, now: DateTime<Utc>) -> String {
    format!("rulekit/{}-{}", stack, now.format("%Y%m%d-%H%M%S"))
}

fn project_name(target: &Path) -> String {
    target
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(target)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Run the push workflow for `opts`.
pub fn push(
    opts: &PushOptions,
    vcs: &dyn VersionControl,
    prompter: &dyn Prompter,
    engine: &TemplateEngine,
) -> Result<PushReport, PushError> {
    vcs.ensure_ready()?;

    let stack = &opts.stack.name;
    let needs_confirmation = stack.is_common() && !opts.stack.is_explicit() && !opts.assume_yes;
    if needs_confirmation && !prompter.confirm(CONFIRM_COMMON)? {
        tracing::info!("push declined at confirmation prompt");
        return Err(PushError::Aborted);
    }

    let scratch = tempfile::Builder::new()
        .prefix("rulekit-push-")
        .tempdir()
        .map_err(|e| io_err(std::env::temp_dir(), e))?;
    let clone_dir = scratch.path().join("templates");

    tracing::info!(repo = %opts.repo, dir = %clone_dir.display(), "cloning template repository");
    vcs.clone_shallow(&opts.repo, &clone_dir)?;
    let branch = branch_name(stack, Utc::now());
    vcs.create_branch(&clone_dir, &branch)?;

    let mut report = PushReport {
        stack: stack.clone(),
        ..PushReport::default()
    };

    if opts.selection.rules {
        report.rules = rules::push_rules(&opts.target, &clone_dir, stack)?;
    }
    if opts.selection.prompts {
        let collected = collector::collect(&opts.target)?;
        let prompt_stack = opts.prompt_stack.clone().unwrap_or_default();
        let changes = prompts::push_prompts(&clone_dir, &collected, &prompt_stack)?;
        report.prompts_updated = changes.updated;
        report.prompts_created = changes.created;
        report.conflicts = collected.conflicts;
    }
    if opts.selection.skills {
        report.skills = skills::push_skills(&opts.target, &clone_dir)?;
    }

    if !vcs.has_changes(&clone_dir)? {
        tracing::info!("template repository unchanged; nothing to push");
        return Ok(report);
    }

    let project = project_name(&opts.target);
    let title = format!("rulekit: update {stack} from {project}");
    let body = engine.render_pr_body(&PullRequestContext {
        project,
        stack: stack.to_string(),
        rules: report.rules.clone(),
        prompts_updated: report.prompts_updated.clone(),
        prompts_created: report.prompts_created.clone(),
        skills: report.skills.clone(),
        conflicts: report.conflicts.iter().map(|c| c.name.clone()).collect(),
    })?;

    vcs.commit_all(&clone_dir, &title)?;
    vcs.push_branch(&clone_dir, &branch)?;
    let url = vcs.open_pull_request(
        &clone_dir,
        &PullRequest {
            title,
            body,
            head: branch.clone(),
            base: opts.base_branch.clone(),
        },
    )?;
    tracing::info!(%url, "opened pull request");

    report.branch = Some(branch);
    report.pr_url = Some(url);
    Ok(report)
}
