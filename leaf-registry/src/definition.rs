//! Template definitions: recipes that produce a [`ResolvedUnit`] on demand.
//!
//! Resolution is never memoized here. A composite definition walks its
//! fragment list and re-reads every fragment from its source on each call, so
//! editing a fragment and resolving again picks up the change. Byte-level
//! memoization belongs in the source (see [`leaf_core::CachingSource`]).

use std::fmt;
use std::sync::Arc;

use leaf_core::Source;
use leaf_renderer::{ResolvedUnit, UnitBuilder};

use crate::error::TemplateError;

/// How a registered template is produced.
#[derive(Debug, Clone)]
pub enum Definition {
    /// An already-resolved unit, returned as-is.
    Static(ResolvedUnit),
    /// Fragments fetched from a source and merged on every resolution.
    Composite(CompositeDefinition),
}

impl Definition {
    /// Produce the unit for this definition.
    pub fn resolve(&self) -> Result<ResolvedUnit, TemplateError> {
        match self {
            Definition::Static(unit) => Ok(unit.clone()),
            Definition::Composite(composite) => composite.resolve(),
        }
    }
}

/// A template assembled from an ordered list of fragments.
#[derive(Clone)]
pub struct CompositeDefinition {
    name: String,
    fragments: Vec<String>,
    source: Arc<dyn Source>,
}

impl CompositeDefinition {
    pub fn new(name: impl Into<String>, fragments: Vec<String>, source: Arc<dyn Source>) -> Self {
        CompositeDefinition {
            name: name.into(),
            fragments,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fragment names in merge order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Load and merge every fragment, in declaration order.
    ///
    /// Stops at the first fragment that fails to load or merge; the partly
    /// built unit is dropped.
    pub fn resolve(&self) -> Result<ResolvedUnit, TemplateError> {
        let mut builder = UnitBuilder::new(self.name.clone());
        for fragment in &self.fragments {
            let bytes = self
                .source
                .load(fragment)
                .map_err(|source| TemplateError::FragmentLoad {
                    template: self.name.clone(),
                    fragment: fragment.clone(),
                    source,
                })?;
            builder
                .merge(fragment, &bytes)
                .map_err(|source| TemplateError::ParseOrMerge {
                    template: self.name.clone(),
                    source,
                })?;
        }
        Ok(builder.finish())
    }
}

impl fmt::Debug for CompositeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDefinition")
            .field("name", &self.name)
            .field("fragments", &self.fragments)
            .finish_non_exhaustive()
    }
}
