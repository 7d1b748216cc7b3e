//! Error types for leaf-registry.

use std::path::PathBuf;

use thiserror::Error;

use leaf_core::SourceError;
use leaf_renderer::{RenderError, UnitError};

/// Errors from resolving, looking up or executing a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template is registered under `name`.
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// The source failed to produce a fragment. `source` is the source's own
    /// error, untouched.
    #[error("template {template}: failed to load fragment {fragment}: {source}")]
    FragmentLoad {
        template: String,
        fragment: String,
        #[source]
        source: SourceError,
    },

    /// A fragment could not be parsed or merged into the template.
    #[error("template {template}: {source}")]
    ParseOrMerge {
        template: String,
        #[source]
        source: UnitError,
    },

    /// Rendering failed: data/template mismatch or a failed write.
    #[error("template {template}: render failed: {source}")]
    Render {
        template: String,
        #[source]
        source: RenderError,
    },
}

impl TemplateError {
    /// `true` for [`TemplateError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::NotFound { .. })
    }

    /// Name of the template the error concerns.
    pub fn template(&self) -> &str {
        match self {
            TemplateError::NotFound { name } => name,
            TemplateError::FragmentLoad { template, .. }
            | TemplateError::ParseOrMerge { template, .. }
            | TemplateError::Render { template, .. } => template,
        }
    }
}

/// Convenience constructor for [`TemplateError::NotFound`].
pub(crate) fn not_found(name: &str) -> TemplateError {
    TemplateError::NotFound { name: name.to_owned() }
}

/// Errors from reading a manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file does not exist.
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the manifest.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with serde_yaml's line context.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
