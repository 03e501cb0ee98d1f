//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! canonical Vec<Endpoint>
//!     → ConfigRenderer::render
//!     → template.rs (handlebars, compiled once at startup)
//!     → ConfigDocument (opaque text, compared byte-for-byte)
//! ```
//!
//! # Design Decisions
//! - Rendering is pure: same canonical input, same document
//! - Document equality stands in for endpoint-set equality
//! - The empty document means "no backends" and is never rendered

pub mod template;

use std::fmt;
use std::path::PathBuf;

use crate::discovery::Endpoint;

pub use template::TemplateRenderer;

/// Rendered configuration text consumed by the supervised process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigDocument(String);

impl ConfigDocument {
    /// The designated "no backends, no process" document.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<String> for ConfigDocument {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for ConfigDocument {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors produced while loading or applying a template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Turns a canonical endpoint list into a configuration document.
pub trait ConfigRenderer {
    fn render(&self, endpoints: &[Endpoint]) -> Result<ConfigDocument, RenderError>;
}
