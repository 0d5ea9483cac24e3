//! # rulekit-sync
//!
//! Content-gated atomic writer and sync orchestration.
//!
//! Call [`pipeline::run`] to render every rule, prompt and skill for one
//! target project, or [`diff::diff_target`] to preview the same plan as
//! unified diffs without touching the filesystem.

pub mod diff;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod rules;
pub mod skills;
pub mod writer;

pub use diff::{diff_target, DiffResult, FileDiff};
pub use error::SyncError;
pub use pipeline::{SyncOptions, SyncReport};
pub use writer::{PlannedFile, WriteResult};
