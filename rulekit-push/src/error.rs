//! Error types for rulekit-push.

use std::path::PathBuf;

use thiserror::Error;

use rulekit_core::CoreError;
use rulekit_renderer::RenderError;

/// All errors that can arise from push operations.
#[derive(Debug, Error)]
pub enum PushError {
    /// Rendering the pull request body failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Reading or parsing a document failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required external program is not on `PATH`.
    #[error("`{tool}` was not found on PATH. {remediation}")]
    ToolMissing {
        tool: &'static str,
        remediation: &'static str,
    },

    /// The version-control CLI is installed but not logged in.
    #[error("not authenticated with GitHub. {remediation}")]
    NotAuthenticated { remediation: &'static str },

    /// An external command exited unsuccessfully.
    #[error("`{program} {args}` failed ({status}): {stderr}")]
    Command {
        program: String,
        args: String,
        status: String,
        stderr: String,
    },

    /// The user declined the confirmation prompt.
    #[error("push aborted")]
    Aborted,

    /// The confirmation prompt could not be shown (no terminal, for one).
    #[error("cannot ask for confirmation ({reason}); pass --yes to continue")]
    ConfirmationUnavailable { reason: String },
}

/// Convenience constructor for [`PushError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PushError {
    PushError::Io {
        path: path.into(),
        source,
    }
}
