//! Error types for leaf-renderer.

use thiserror::Error;

/// A fragment could not be parsed or merged into the unit under construction.
#[derive(Debug, Error)]
pub enum UnitError {
    /// Fragment bytes are not UTF-8 text.
    #[error("fragment {fragment} is not valid UTF-8: {source}")]
    Encoding {
        fragment: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The fragment names its own parent; merge order comes from the
    /// definition, so fragments may not.
    #[error("fragment {fragment} declares `extends`; parents are implied by fragment order")]
    ForeignExtends { fragment: String },

    /// Tera rejected the fragment (syntax, duplicate block, broken inheritance).
    #[error("failed to parse fragment {fragment}: {source}")]
    Parse {
        fragment: String,
        #[source]
        source: tera::Error,
    },
}

impl UnitError {
    /// Name of the fragment that failed.
    pub fn fragment(&self) -> &str {
        match self {
            UnitError::Encoding { fragment, .. }
            | UnitError::ForeignExtends { fragment }
            | UnitError::Parse { fragment, .. } => fragment,
        }
    }
}

/// All errors that can arise while rendering a resolved unit.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error, including failed writes to the sink.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Render data could not be serialized.
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Render data serialized to something other than an object or null.
    #[error("render data must serialize to an object or null, got {kind}")]
    InvalidData { kind: &'static str },

    /// The unit was built from zero fragments.
    #[error("template {name} is empty: no fragments were merged")]
    Empty { name: String },
}
