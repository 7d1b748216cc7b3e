//! # leaf-registry
//!
//! Named templates composed from fragments, in two lifecycle stages:
//!
//! - [`Registry`]: mutable, resolves on demand (hot reload during development)
//! - [`Container`]: immutable snapshot produced by [`Registry::compile`];
//!   every template is resolved up front so errors surface at startup
//!
//! [`Manifest`] describes a file-backed registry in YAML.

pub mod container;
pub mod definition;
pub mod error;
pub mod manifest;
pub mod registry;

pub use container::Container;
pub use definition::{CompositeDefinition, Definition};
pub use error::{ManifestError, TemplateError};
pub use manifest::{Manifest, DEFAULT_MANIFEST};
pub use registry::Registry;

pub use leaf_core::{CachingSource, EmptySource, FileSource, FnSource, MemorySource, Source, SourceError};
pub use leaf_renderer::{RenderError, ResolvedUnit, UnitBuilder, UnitError};
