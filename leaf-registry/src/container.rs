//! [`Container`]: the immutable, pre-resolved template set.
//!
//! Produced by [`Registry::compile`](crate::Registry::compile). Every unit is
//! resolved up front, so lookups do no I/O and cannot fail for any reason but
//! an unknown name. There are no mutation methods; share it behind an `Arc`
//! and read from any number of threads without locking.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use leaf_renderer::ResolvedUnit;

use crate::error::{not_found, TemplateError};

/// Immutable name → unit mapping.
#[derive(Debug, Clone)]
pub struct Container {
    units: HashMap<String, ResolvedUnit>,
}

impl Container {
    pub(crate) fn new(units: HashMap<String, ResolvedUnit>) -> Self {
        Container { units }
    }

    /// Look a unit up by name.
    pub fn get(&self, name: &str) -> Result<&ResolvedUnit, TemplateError> {
        self.units.get(name).ok_or_else(|| not_found(name))
    }

    /// Render `name` with `data` into `out`.
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

    /// Render `name` with `data` into a `String`.
    pub fn render<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<String, TemplateError> {
        self.get(name)?
            .render(data)
            .map_err(|source| TemplateError::Render {
                template: name.to_owned(),
                source,
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.units.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
