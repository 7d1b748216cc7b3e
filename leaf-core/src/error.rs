//! Error types for leaf-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors a [`Source`](crate::Source) can report.
///
/// The registry never reinterprets these; they travel up to the caller as the
/// `#[source]` of whatever error wraps them.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No fragment is stored under `name`.
    #[error("fragment not found: {name}")]
    NotFound { name: String },

    /// `name` cannot be mapped onto the underlying store (e.g. it would
    /// escape a [`FileSource`](crate::FileSource) root).
    #[error("invalid fragment name: {name}")]
    InvalidName { name: String },

    /// Underlying I/O failure, with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other failure raised by a custom source.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SourceError {
    /// Convenience constructor for [`SourceError::NotFound`].
    pub fn not_found(name: impl Into<String>) -> Self {
        SourceError::NotFound { name: name.into() }
    }

    /// `true` when the fragment simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}

/// Convenience constructor for [`SourceError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SourceError {
    SourceError::Io {
        path: path.into(),
        source,
    }
}
