//! # leaf-renderer
//!
//! Tera-backed resolved units: fragments are parsed and merged in order into
//! a [`ResolvedUnit`], which renders any serializable data into a writer.
//!
//! ## Usage
//!
//! ```rust
//! use leaf_renderer::UnitBuilder;
//!
//! let mut builder = UnitBuilder::new("page");
//! builder.merge("base", b"<{% block title %}{% endblock %}>").unwrap();
//! builder.merge("home", b"{% block title %}Home{% endblock %}").unwrap();
//! let unit = builder.finish();
//!
//! assert_eq!(unit.render(&()).unwrap(), "<Home>");
//! ```

pub mod context;
pub mod error;
pub mod unit;

pub use error::{RenderError, UnitError};
pub use unit::{ResolvedUnit, UnitBuilder};
