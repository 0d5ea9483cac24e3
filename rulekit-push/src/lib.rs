//! # rulekit-push
//!
//! The reverse of sync: read the documents a project currently holds,
//! turn them back into canonical sources inside a scratch clone of the
//! template repository, and open a pull request with whatever changed.
//!
//! - [`collector`]: deduplicate the three local copies of each prompt
//! - [`rules`], [`prompts`], [`skills`]: write-back into the scratch clone
//! - [`vcs`]: the [`VersionControl`] seam and its `gh`/`git` implementation
//! - [`workflow`]: the clone → branch → diff → commit → PR state machine

pub mod collector;
pub mod error;
pub mod prompts;
pub mod rules;
pub mod skills;
pub mod vcs;
pub mod workflow;

pub use collector::{Collected, Conflict};
pub use error::PushError;
pub use vcs::{GhCli, PullRequest, VersionControl};
pub use workflow::{push, Prompter, PushOptions, PushReport};
