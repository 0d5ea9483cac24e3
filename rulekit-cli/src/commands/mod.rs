pub mod diff;
pub mod push;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rulekit_core::{config, stack, Selection, Settings};
use rulekit_renderer::TemplateEngine;
use rulekit_sync::SyncOptions;

/// `--rules` / `--prompts` / `--skills`; none given selects all three.
#[derive(Args, Debug, Clone, Copy)]
pub struct SelectionArgs {
    /// Include rule documents.
    #[arg(long)]
    pub rules: bool,

    /// Include prompt files.
    #[arg(long)]
    pub prompts: bool,

    /// Include skills.
    #[arg(long)]
    pub skills: bool,
}

impl SelectionArgs {
    pub fn selection(self) -> Selection {
        Selection::from_flags(self.rules, self.prompts, self.skills)
    }
}

/// Options shared by `sync` and `diff`.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Local checkout of the template repository (default: `source` in ~/.rulekit/config.yaml).
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Project to write into.
    #[arg(long, default_value = ".")]
    pub target: PathBuf,

    /// Stack to layer over `common` (default: .env, then the synced AGENTS.md, then `common`).
    #[arg(long)]
    pub stack: Option<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

impl SourceArgs {
    /// Merge flags with the settings file, resolve the stack and load templates.
    pub fn prepare(&self, dry_run: bool) -> Result<(SyncOptions, TemplateEngine)> {
        let home = config::home()?;
        let settings = Settings::load_at(&home)?;
        let source = settings.source_or(self.source.clone(), &home)?;
        let stack = stack::resolve(self.stack.as_deref(), &self.target);
        tracing::info!("using stack `{}` (from {})", stack.name, stack.source);

        if !self.target.is_dir() {
            anyhow::bail!("target {} is not a directory", self.target.display());
        }
        let target = self
            .target
            .canonicalize()
            .with_context(|| format!("cannot resolve target {}", self.target.display()))?;

        let opts = SyncOptions {
            source,
            target,
            stack,
            selection: self.selection.selection(),
            dry_run,
        };
        Ok((opts, template_engine(&settings)?))
    }
}

/// Embedded templates, overridden by the `templates` directory from settings.
pub fn template_engine(settings: &Settings) -> Result<TemplateEngine> {
    TemplateEngine::new(settings.templates.as_deref()).context("failed to load templates")
}
