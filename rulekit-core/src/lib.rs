//! rulekit core library: conventions, documents, stack resolution, errors.
//!
//! - [`config`]: fixed naming conventions and the optional user settings file
//! - [`types`]: [`StackName`] and the [`Document`] / [`Metadata`] pair
//! - [`frontmatter`]: split / join a document's YAML header and body
//! - [`stack`]: decide which stack applies to a target project
//! - [`fs`]: deterministic directory walking and tree copies
//! - [`error`]: [`CoreError`]

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod fs;
pub mod stack;
pub mod types;

pub use config::Settings;
pub use error::CoreError;
pub use types::{Document, Metadata, Selection, StackName};
