//! Error types for rulekit-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The frontmatter block is not valid YAML.
    #[error("invalid frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    /// The frontmatter block parsed, but not to a key/value mapping.
    #[error("frontmatter must be a mapping of keys to values")]
    FrontmatterNotMapping,

    /// Settings file parse error: includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting was supplied neither on the command line nor in the settings file.
    #[error("no {key} configured; pass --{flag} or set `{key}` in {path}")]
    MissingSetting {
        key: &'static str,
        flag: &'static str,
        path: PathBuf,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.rulekit/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`CoreError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
