//! `rulekit diff`: show unified diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;

use rulekit_sync::diff_target;

use super::SourceArgs;

/// Arguments for `rulekit diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub common: SourceArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let (opts, engine) = self.common.prepare(true)?;

        let result = diff_target(&opts, &engine)
            .with_context(|| format!("diff failed for {}", opts.target.display()))?;

        if result.diffs.is_empty() {
            println!("No differences for {}.", result.target.display());
            return Ok(());
        }

        for diff in result.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
