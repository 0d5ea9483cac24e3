//! rulekit: share agent rules, prompts and skills between a template
//! repository and the projects that consume it.
//!
//! # Usage
//!
//! ```text
//! rulekit sync [--source <dir>] [--target <dir>] [--stack <name>] [--rules] [--prompts] [--skills] [--dry-run] [--json]
//! rulekit diff [--source <dir>] [--target <dir>] [--stack <name>] [--rules] [--prompts] [--skills]
//! rulekit push [--repo <owner/name>] [--base <branch>] [--target <dir>] [--stack <name>]
//!              [--prompt-stack <name>] [--rules] [--prompts] [--skills] [--yes]
//! ```
//!
//! Diagnostics go to stderr; `-v` shows progress, `-vv` shows every step.
//! `RUST_LOG` overrides both.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, push::PushArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "rulekit",
    version,
    about = "Sync layered agent rules, prompts and skills into projects, and push edits back",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write merged rules, prompt variants and skills into a project.
    Sync(SyncArgs),

    /// Show unified diff of what sync would write for a project.
    Diff(DiffArgs),

    /// Turn local edits back into canonical sources and open a pull request.
    Push(PushArgs),
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Push(args) => args.run(),
    }
}
