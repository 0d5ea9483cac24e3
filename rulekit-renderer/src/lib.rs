//! # rulekit-renderer
//!
//! Pure transforms from canonical sources to the documents written into a
//! target project, and back:
//!
//! - [`formats`]: one canonical prompt to three editor-specific files
//! - [`merge`]: layered rule bodies joined with a fixed separator, and split again
//! - [`engine`]: tera templates for the injected guidance section and PR bodies
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rulekit_core::frontmatter;
//! use rulekit_renderer::PromptFormat;
//!
//! fn render_all(raw: &str) {
//!     if let Ok(source) = frontmatter::parse(raw) {
//!         for format in PromptFormat::all() {
//!             if let Ok(text) = format.render(&source, "code-review") {
//!                 println!("{}: {} bytes", format, text.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod formats;
pub mod merge;

pub use context::{GuidanceContext, PullRequestContext};
pub use engine::TemplateEngine;
pub use error::RenderError;
pub use formats::PromptFormat;
