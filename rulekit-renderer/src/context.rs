//! Template contexts: serializable rendering payloads.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Commands quoted back to the reader of a generated file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsCtx {
    pub sync: String,
    pub push: String,
}

/// Payload for the guidance section appended to the root rule document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceContext {
    pub stack: String,
    pub commands: CommandsCtx,
    pub rulekit_version: String,
}

impl GuidanceContext {
    pub fn new(stack: &str) -> Self {
        Self {
            stack: stack.to_owned(),
            commands: CommandsCtx {
                sync: format!("rulekit sync --stack {stack}"),
                push: format!("rulekit push --stack {stack}"),
            },
            rulekit_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Payload for the body of a push pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestContext {
    /// Directory name of the project the changes were pushed from.
    pub project: String,
    pub stack: String,
    /// Canonical rule files, relative to the template repository root.
    pub rules: Vec<String>,
    pub prompts_updated: Vec<String>,
    pub prompts_created: Vec<String>,
    pub skills: Vec<String>,
    /// Logical prompt names whose local copies disagreed.
    pub conflicts: Vec<String>,
}

impl PullRequestContext {
    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
