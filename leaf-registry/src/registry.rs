//! [`Registry`]: the mutable, build-time template set.
//!
//! # Lifecycle
//!
//! ```text
//! Registry::new(source)
//!   .define("page", ["base.html", "page.html"])   no I/O, last write wins
//!   .set("raw", unit)                             pre-built unit
//!   .get("page")                                  resolves now, every call
//!   .compile()                                    all-or-nothing → Container
//! ```
//!
//! `get` re-resolves on every call, which is what makes hot reload work
//! during development. In production, call [`Registry::compile`] at startup
//! and serve from the returned [`Container`]; a broken template then stops
//! startup instead of failing a request.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use leaf_core::{EmptySource, Source};
use leaf_renderer::ResolvedUnit;

use crate::container::Container;
use crate::definition::{CompositeDefinition, Definition};
use crate::error::{not_found, TemplateError};

/// Mutable name → definition mapping.
///
/// Definitions sit behind a lock, so a registry can be shared across threads;
/// resolution itself runs outside the lock.
pub struct Registry {
    source: Arc<dyn Source>,
    definitions: RwLock<BTreeMap<String, Definition>>,
}

impl Registry {
    /// Create an empty registry whose composite templates read from `source`.
    pub fn new<S: Source + 'static>(source: S) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    /// Like [`Registry::new`], for a source that is shared elsewhere.
    pub fn with_shared_source(source: Arc<dyn Source>) -> Self {
        Registry {
            source,
            definitions: RwLock::new(BTreeMap::new()),
        }
    }

    /// The source captured by [`Registry::define`].
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    /// Declare `name` as the ordered merge of `fragments`.
    ///
    /// Replaces any previous definition of `name`. Nothing is loaded until
    /// the template is resolved.
    pub fn define<I, S>(&self, name: impl Into<String>, fragments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let fragments: Vec<String> = fragments.into_iter().map(Into::into).collect();
        tracing::debug!(template = %name, fragments = fragments.len(), "template defined");
        let definition = CompositeDefinition::new(name.clone(), fragments, Arc::clone(&self.source));
        self.write().insert(name, Definition::Composite(definition));
    }

    /// Register an already-resolved unit under `name`, replacing any previous
    /// definition.
    pub fn set(&self, name: impl Into<String>, unit: ResolvedUnit) {
        let name = name.into();
        tracing::debug!(template = %name, "template set");
        self.write().insert(name, Definition::Static(unit));
    }

    /// Drop the definition of `name`. Returns whether one existed.
    pub fn remove(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Current definition of `name`, if any.
    pub fn definition(&self, name: &str) -> Option<Definition> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered template names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Resolve `name` now.
    ///
    /// Composite templates are rebuilt from their fragments on every call.
    pub fn get(&self, name: &str) -> Result<ResolvedUnit, TemplateError> {
        let definition = self.definition(name).ok_or_else(|| not_found(name))?;
        definition.resolve()
    }

    /// Resolve `name` and render it with `data` into `out`.
    pub fn execute<T, W>(&self, name: &str, out: W, data: &T) -> Result<(), TemplateError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        self.get(name)?
            .render_to(data, out)
            .map_err(|source| TemplateError::Render {
                template: name.to_owned(),
                source,
            })
    }

    /// Resolve every definition into an immutable [`Container`].
    ///
    /// Stops at the first template that fails and returns its error; no
    /// container is produced in that case. Templates are resolved in name
    /// order, so the reported failure is stable. Each call resolves afresh
    /// from the current definitions.
    pub fn compile(&self) -> Result<Container, TemplateError> {
        let snapshot: Vec<(String, Definition)> = self
            .read()
            .iter()
            .map(|(name, definition)| (name.clone(), definition.clone()))
            .collect();

        let mut units = HashMap::with_capacity(snapshot.len());
        for (name, definition) in snapshot {
            let unit = definition.resolve()?;
            units.insert(name, unit);
        }

        tracing::info!(templates = units.len(), "registry compiled");
        Ok(Container::new(units))
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Definition>> {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Definition>> {
        self.definitions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    /// A registry with no fragment source; only [`Registry::set`] units resolve.
    fn default() -> Self {
        Registry::new(EmptySource)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("definitions", &*self.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leaf_core::MemorySource;

    #[test]
    fn define_overwrites_previous_definition() {
        let registry = Registry::new(MemorySource::from_iter([("a", "A"), ("b", "B")]));
        registry.define("t", ["a"]);
        registry.define("t", ["b"]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("t").unwrap().render(&()).unwrap(), "B");
    }

    #[test]
    fn set_replaces_a_composite_definition() {
        let registry = Registry::new(MemorySource::from_iter([("a", "A")]));
        registry.define("t", ["a"]);
        registry.set("t", ResolvedUnit::parse("t", "static").unwrap());
        assert!(matches!(registry.definition("t"), Some(Definition::Static(_))));
        assert_eq!(registry.get("t").unwrap().render(&()).unwrap(), "static");
    }

    #[test]
    fn define_does_no_io() {
        let registry = Registry::default();
        registry.define("t", ["never/loaded.html"]);
        assert!(registry.contains("t"));
        let err = registry.get("t").unwrap_err();
        assert!(matches!(err, TemplateError::FragmentLoad { .. }), "got: {err}");
    }

    #[test]
    fn remove_forgets_the_template() {
        let registry = Registry::default();
        registry.set("t", ResolvedUnit::parse("t", "x").unwrap());
        assert!(registry.remove("t"));
        assert!(!registry.remove("t"));
        assert!(registry.get("t").unwrap_err().is_not_found());
        assert!(registry.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let registry = Registry::default();
        for name in ["zeta", "alpha", "mid"] {
            registry.define(name, Vec::<String>::new());
        }
        assert_eq!(registry.names(), ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn compile_reports_the_first_failure_in_name_order() {
        let registry = Registry::new(MemorySource::from_iter([("ok", "fine")]));
        registry.define("a_ok", ["ok"]);
        registry.define("b_broken", ["missing_one"]);
        registry.define("c_broken", ["missing_two"]);
        let err = registry.compile().unwrap_err();
        assert_eq!(err.template(), "b_broken");
    }
}
