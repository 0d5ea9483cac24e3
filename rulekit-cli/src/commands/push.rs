//! `rulekit push`: send local edits back to the template repository as a pull request.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use inquire::{Confirm, InquireError};

use rulekit_core::fs::display_relative;
use rulekit_core::{config, stack, Settings, StackName};
use rulekit_push::{GhCli, Prompter, PushError, PushOptions, PushReport};

use super::SelectionArgs;

/// Arguments for `rulekit push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Template repository as `owner/name` (default: `repo` in ~/.rulekit/config.yaml).
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch the pull request targets (default: `base_branch` in settings, then the remote default).
    #[arg(long)]
    pub base: Option<String>,

    /// Project to read edits from.
    #[arg(long, default_value = ".")]
    pub target: PathBuf,

    /// Stack whose layer receives rule edits (default: .env, then the synced AGENTS.md, then `common`).
    #[arg(long)]
    pub stack: Option<String>,

    /// Stack directory for prompts that do not exist in the template yet (default: `common`).
    #[arg(long)]
    pub prompt_stack: Option<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Answer yes to the confirmation asked before pushing into `common`.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home()?;
        let settings = Settings::load_at(&home)?;
        let repo = settings.repo_or(self.repo.clone(), &home)?;
        let base_branch = self.base.clone().or_else(|| settings.base_branch.clone());

        if !self.target.is_dir() {
            anyhow::bail!("target {} is not a directory", self.target.display());
        }
        let target = self
            .target
            .canonicalize()
            .with_context(|| format!("cannot resolve target {}", self.target.display()))?;
        let stack = stack::resolve(self.stack.as_deref(), &target);
        tracing::info!("using stack `{}` (from {})", stack.name, stack.source);

        let opts = PushOptions {
            target: target.clone(),
            repo,
            base_branch,
            stack,
            prompt_stack: self.prompt_stack.as_deref().map(StackName::from),
            selection: self.selection.selection(),
            assume_yes: self.yes,
        };

        let vcs = GhCli::locate()?;
        let engine = super::template_engine(&settings)?;
        let result = rulekit_push::push(&opts, &vcs, &InquirePrompter, &engine);
        match settle(result, &opts.repo)? {
            Some(report) => print_report(&report, &target),
            None => println!("push cancelled"),
        }
        Ok(())
    }
}

/// A declined confirmation is not a failure.
fn settle(result: Result<PushReport, PushError>, repo: &str) -> Result<Option<PushReport>> {
    match result {
        Ok(report) => Ok(Some(report)),
        Err(PushError::Aborted) => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context(format!("push to {repo} failed"))),
    }
}

/// Asks on the terminal; defaults to no.
struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn confirm(&self, message: &str) -> Result<bool, PushError> {
        match Confirm::new(message).with_default(false).prompt() {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
            Err(err) => Err(PushError::ConfirmationUnavailable {
                reason: err.to_string(),
            }),
        }
    }
}

fn print_report(report: &PushReport, target: &Path) {
    for conflict in &report.conflicts {
        println!(
            "{} '{}' differs between {}; kept {}",
            "!".yellow().bold(),
            conflict.name,
            conflict
                .paths
                .iter()
                .map(|p| display_relative(p, target))
                .collect::<Vec<_>>()
                .join(", "),
            display_relative(&conflict.chosen, target)
        );
    }

    let Some(url) = &report.pr_url else {
        println!("✓ '{}': no changes", report.stack);
        return;
    };

    println!("{} '{}' pushed", "✓".green().bold(), report.stack);
    print_section("rules", &report.rules);
    print_section("prompts updated", &report.prompts_updated);
    print_section("prompts created", &report.prompts_created);
    print_section("skills", &report.skills);
    println!("  pull request: {}", url.cyan());
}

fn print_section(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {label}:");
    for item in items {
        println!("    ✎  {item}");
    }
}
