//! Leaf core library: fragment sources and the caching decorator.
//!
//! Public API surface:
//! - [`source`]: the [`Source`] contract plus file, memory, function and empty sources
//! - [`cache`]: [`CachingSource`]
//! - [`error`]: [`SourceError`]

pub mod cache;
pub mod error;
pub mod source;

pub use cache::CachingSource;
pub use error::SourceError;
pub use source::{EmptySource, FileSource, FnSource, MemorySource, Source};
