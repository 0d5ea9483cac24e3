//! `rulekit sync`: render and write rules, prompts and skills into a project.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use rulekit_core::fs::display_relative;
use rulekit_sync::{pipeline, SyncReport, WriteResult};

use super::SourceArgs;

/// Arguments for `rulekit sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub common: SourceArgs,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let (opts, engine) = self.common.prepare(self.dry_run)?;

        let report = pipeline::run(&opts, &engine)
            .with_context(|| format!("sync failed for {}", opts.target.display()))?;

        if self.json {
            println!("{}", report.to_json()?);
        } else {
            print_results(&report, &opts.target);
        }
        Ok(())
    }
}

fn print_results(report: &SyncReport, target: &Path) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let stack = report.stack.as_str();

    if report.writes.is_empty() {
        println!("{prefix}✓ '{stack}': nothing to do");
        return;
    }

    let unchanged = report.writes.len() - report.changed();
    println!(
        "{prefix}{} '{stack}' synced ({} written, {} unchanged)",
        "✓".green().bold(),
        report.changed(),
        unchanged
    );

    for r in &report.writes {
        let path = display_relative(r.path(), target);
        match r {
            WriteResult::Written { .. } => println!("  ✎  {path}"),
            WriteResult::WouldWrite { .. } => println!("  ~  {path}"),
            WriteResult::Unchanged { .. } => println!("  ·  {}", path.dimmed()),
        }
    }
}
