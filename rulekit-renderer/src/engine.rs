//! Tera rendering engine for the prose rulekit generates itself.
//!
//! | Template                | Used for                                        |
//! |-------------------------|-------------------------------------------------|
//! | `guidance.md.tera`      | section appended to the root `AGENTS.md` on sync |
//! | `pr_body.md.tera`       | pull request body opened by push                |
//!
//! Both are embedded at compile time; a user template directory may override
//! either by providing a file with the same name.

use std::collections::BTreeMap;
use std::path::Path;

use tera::Tera;

use rulekit_core::config::GUIDANCE_HEADING;

use crate::context::{GuidanceContext, PullRequestContext};
use crate::error::RenderError;

pub const GUIDANCE_TEMPLATE: &str = "guidance.md.tera";
pub const PR_BODY_TEMPLATE: &str = "pr_body.md.tera";

// ---------------------------------------------------------------------------
// Embedded templates
// ---------------------------------------------------------------------------

const EMBEDDED: &[(&str, &str)] = &[
    (GUIDANCE_TEMPLATE, include_str!("templates/guidance.md.tera")),
    (PR_BODY_TEMPLATE, include_str!("templates/pr_body.md.tera")),
];

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// `*.tera` files directly inside `dir`, keyed by lower-cased file name.
///
/// A missing directory has no overrides.
fn read_overrides(dir: &Path) -> Result<BTreeMap<String, String>, RenderError> {
    let mut found = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(found);
    }
    let entries = std::fs::read_dir(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let path = entry
            .map_err(|source| RenderError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_template = path.is_file() && path.extension().is_some_and(|ext| ext == "tera");
        let Some(name) = path.file_name().and_then(|n| n.to_str()).filter(|_| is_template) else {
            continue;
        };
        let text = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        found.insert(name.to_lowercase(), text);
    }
    Ok(found)
}

fn build_tera(override_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut sources: BTreeMap<String, String> = EMBEDDED
        .iter()
        .map(|(name, text)| ((*name).to_owned(), (*text).to_owned()))
        .collect();
    if let Some(dir) = override_dir {
        for (name, text) in read_overrides(dir)? {
            tracing::debug!(template = %name, dir = %dir.display(), "template overridden");
            sources.insert(name, text);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(sources)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine with optional user overrides.
///
/// Create once with [`TemplateEngine::new`] and reuse.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Embedded templates, with same-named files from `override_dir` taking
    /// their place.
    pub fn new(override_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(override_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Embedded templates only.
    pub fn embedded() -> Result<Self, RenderError> {
        Self::new(None)
    }

    /// Render the guidance section for `ctx`.
    ///
    /// The output always opens with [`GUIDANCE_HEADING`] so push can find and
    /// strip it, even when a user override forgets the heading.
    pub fn render_guidance(&self, ctx: &GuidanceContext) -> Result<String, RenderError> {
        let rendered = self
            .tera
            .render(GUIDANCE_TEMPLATE, &ctx.to_tera_context()?)?
            .replace("\r\n", "\n");
        let rendered = rendered.trim();
        if rendered.starts_with(GUIDANCE_HEADING) {
            Ok(format!("{rendered}\n"))
        } else {
            Ok(format!("{GUIDANCE_HEADING}\n\n{rendered}\n"))
        }
    }

    /// Render a pull request body for `ctx`.
    pub fn render_pr_body(&self, ctx: &PullRequestContext) -> Result<String, RenderError> {
        let rendered = self.tera.render(PR_BODY_TEMPLATE, &ctx.to_tera_context()?)?;
        Ok(format!("{}\n", rendered.trim()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
