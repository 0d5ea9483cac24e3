//! Error types for rulekit-renderer.

use std::path::PathBuf;

use thiserror::Error;

use rulekit_core::CoreError;

/// All errors that can arise from rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Frontmatter encoding error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}
