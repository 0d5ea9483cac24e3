//! Sync pipeline entrypoint used by `rulekit sync` and `rulekit diff`.

use std::path::PathBuf;

use serde::Serialize;

use rulekit_core::stack::ResolvedStack;
use rulekit_core::{Selection, StackName};
use rulekit_renderer::TemplateEngine;

use crate::error::SyncError;
use crate::writer::{atomic_write, PlannedFile, WriteResult};
use crate::{prompts, rules, skills};

/// Inputs for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Root of the template checkout.
    pub source: PathBuf,
    /// Root of the consuming project.
    pub target: PathBuf,
    pub stack: ResolvedStack,
    pub selection: Selection,
    pub dry_run: bool,
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub stack: StackName,
    /// Which level of the resolution chain picked the stack.
    pub stack_source: String,
    pub dry_run: bool,
    pub writes: Vec<WriteResult>,
}

impl SyncReport {
    pub fn changed(&self) -> usize {
        self.writes.iter().filter(|w| w.is_change()).count()
    }

    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render every selected file without writing anything.
///
/// Missing source directories contribute nothing.
pub fn plan(opts: &SyncOptions, engine: &TemplateEngine) -> Result<Vec<PlannedFile>, SyncError> {
    let stack = &opts.stack.name;
    let mut planned = Vec::new();
    if opts.selection.rules {
        planned.extend(rules::plan_rules(&opts.source, &opts.target, stack, engine)?);
    }
    if opts.selection.prompts {
        planned.extend(prompts::plan_prompts(&opts.source, &opts.target, stack)?);
    }
    if opts.selection.skills {
        planned.extend(skills::plan_skills(&opts.source, &opts.target)?);
    }
    Ok(planned)
}

/// Run the sync pipeline: plan, then write each file atomically.
pub fn run(opts: &SyncOptions, engine: &TemplateEngine) -> Result<SyncReport, SyncError> {
    tracing::info!(
        "syncing stack `{}` (from {}) into {}",
        opts.stack.name,
        opts.stack.source,
        opts.target.display()
    );
    if !opts.source.is_dir() {
        tracing::warn!("source {} does not exist; nothing to sync", opts.source.display());
    }

    let mut writes = Vec::new();
    for file in plan(opts, engine)? {
        writes.push(atomic_write(&file, opts.dry_run)?);
    }

    Ok(SyncReport {
        stack: opts.stack.name.clone(),
        stack_source: opts.stack.source.to_string(),
        dry_run: opts.dry_run,
        writes,
    })
}
