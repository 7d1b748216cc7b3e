//! [`ResolvedUnit`]: one named, render-ready template merged from fragments.
//!
//! # Merge model
//!
//! Each fragment is registered in a private [`Tera`] instance. The first
//! fragment is the skeleton; every later fragment is registered as a child
//! that extends the fragment before it:
//!
//! ```text
//! fragment#0  base.html     {% block header %}{% endblock %}{% block main %}...
//! fragment#1  header.html   {% extends "fragment#0" %} + source
//! fragment#2  main.html     {% extends "fragment#1" %} + source
//! ```
//!
//! Rendering starts at the last fragment, so for any block name the latest
//! fragment defining it wins and `{{ super() }}` reaches the one before.
//! A later fragment with content outside its blocks becomes the new root:
//! everything merged before is re-layered beneath it, and a second copy of
//! it goes on top so its own blocks keep winning.
//!
//! Interpolated data is HTML-escaped.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tera::Tera;

use crate::context::to_tera_context;
use crate::error::{RenderError, UnitError};

fn layer_name(index: usize) -> String {
    format!("fragment#{index}")
}

/// Tera source for layer `index`: every layer but the root extends the one
/// below it.
fn layer_source(index: usize, text: &str) -> String {
    match index.checked_sub(1) {
        None => text.to_owned(),
        Some(parent) => format!("{{% extends \"{}\" %}}{}", layer_name(parent), text),
    }
}

/// Tera instance with HTML escaping on for every layer name.
fn layer_engine() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![""]);
    tera
}

/// `true` when the text opens with an `{% extends %}` tag.
fn declares_extends(text: &str) -> bool {
    let Some(rest) = text.trim_start().strip_prefix("{%") else {
        return false;
    };
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    rest.trim_start().starts_with("extends")
}

/// `true` when the text has content outside its `{% block %}` tags: literal
/// text other than whitespace, an expression, or any other statement.
/// Comments do not count. An unterminated tag is left for Tera to report.
fn has_body(text: &str) -> bool {
    let mut depth = 0usize;
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let (before, from) = rest.split_at(open);
        if depth == 0 && !before.trim().is_empty() {
            return true;
        }
        let close = match from.as_bytes().get(1) {
            Some(b'%') => "%}",
            Some(b'{') => "}}",
            Some(b'#') => "#}",
            _ => {
                if depth == 0 {
                    return true;
                }
                rest = &from[1..];
                continue;
            }
        };
        let Some(end) = from[2..].find(close) else {
            return false;
        };
        let inner = &from[2..2 + end];
        rest = &from[2 + end + close.len()..];

        match close {
            "%}" => match inner.trim_matches('-').split_whitespace().next() {
                Some("block") => depth += 1,
                Some("endblock") => depth = depth.saturating_sub(1),
                _ if depth == 0 => return true,
                _ => {}
            },
            "}}" if depth == 0 => return true,
            _ => {}
        }
    }
    depth == 0 && !rest.trim().is_empty()
}

// ---------------------------------------------------------------------------
// UnitBuilder
// ---------------------------------------------------------------------------

/// Accumulates fragments, in order, into a [`ResolvedUnit`].
pub struct UnitBuilder {
    name: String,
    fragments: Vec<String>,
    /// Fragment texts in Tera layer order; `layers[0]` is the root.
    layers: Vec<String>,
    tera: Tera,
}

impl UnitBuilder {
    /// Start an empty unit named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        UnitBuilder {
            name: name.into(),
            fragments: Vec::new(),
            layers: Vec::new(),
            tera: layer_engine(),
        }
    }

    /// Parse `bytes` and merge them on top of everything merged so far.
    ///
    /// A fragment with content outside its blocks replaces the root body;
    /// blocks merged earlier stay beneath it and its own blocks still win.
    /// On error the builder should be dropped; the fragment is not recorded.
    pub fn merge(&mut self, fragment: &str, bytes: &[u8]) -> Result<(), UnitError> {
        let text = std::str::from_utf8(bytes).map_err(|source| UnitError::Encoding {
            fragment: fragment.to_owned(),
            source,
        })?;
        if declares_extends(text) {
            return Err(UnitError::ForeignExtends { fragment: fragment.to_owned() });
        }
        let parse_err = |source| UnitError::Parse {
            fragment: fragment.to_owned(),
            source,
        };

        if self.layers.is_empty() || !has_body(text) {
            let index = self.layers.len();
            self.tera
                .add_raw_template(&layer_name(index), &layer_source(index, text))
                .map_err(parse_err)?;
            self.layers.push(text.to_owned());
        } else {
            let mut layers = Vec::with_capacity(self.layers.len() + 2);
            layers.push(text.to_owned());
            layers.extend(self.layers.iter().cloned());
            layers.push(text.to_owned());

            let mut tera = layer_engine();
            tera.add_raw_templates(
                layers
                    .iter()
                    .enumerate()
                    .map(|(index, layer)| (layer_name(index), layer_source(index, layer))),
            )
            .map_err(parse_err)?;
            self.tera = tera;
            self.layers = layers;
        }

        self.fragments.push(fragment.to_owned());
        Ok(())
    }

    /// Seal the unit.
    pub fn finish(self) -> ResolvedUnit {
        tracing::trace!(
            template = %self.name,
            fragments = self.fragments.len(),
            layers = self.layers.len(),
            "unit merged"
        );
        ResolvedUnit {
            inner: Arc::new(UnitInner {
                name: self.name,
                fragments: self.fragments,
                layers: self.layers.len(),
                tera: self.tera,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedUnit
// ---------------------------------------------------------------------------

struct UnitInner {
    name: String,
    fragments: Vec<String>,
    layers: usize,
    tera: Tera,
}

/// A merged template, ready to render.
///
/// Cloning is cheap and clones share the parsed fragments. Units are
/// immutable and `Send + Sync`.
#[derive(Clone)]
pub struct ResolvedUnit {
    inner: Arc<UnitInner>,
}

impl ResolvedUnit {
    /// Parse a single fragment of `text` into a unit named `name`.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, UnitError> {
        let name = name.into();
        let mut builder = UnitBuilder::new(name.clone());
        builder.merge(&name, text.as_bytes())?;
        Ok(builder.finish())
    }

    /// Name the unit was declared under.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Fragment names in merge order.
    pub fn fragments(&self) -> &[String] {
        &self.inner.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fragments.is_empty()
    }

    /// Whether both handles share the same parsed unit.
    pub fn ptr_eq(a: &ResolvedUnit, b: &ResolvedUnit) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Render with `data` into `out`.
    ///
    /// `data` must serialize to an object (its fields become variables) or
    /// to null (no variables). Interpolated values are HTML-escaped unless
    /// passed through Tera's `safe` filter.
    pub fn render_to<T, W>(&self, data: &T, out: W) -> Result<(), RenderError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let Some(last) = self.inner.layers.checked_sub(1) else {
            return Err(RenderError::Empty { name: self.inner.name.clone() });
        };
        let ctx = to_tera_context(data)?;
        self.inner.tera.render_to(&layer_name(last), &ctx, out)?;
        Ok(())
    }

    /// Render with `data` into a `String`.
    pub fn render<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.render_to(data, &mut buf)?;
        // Tera only emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Debug for ResolvedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedUnit")
            .field("name", &self.inner.name)
            .field("fragments", &self.inner.fragments)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
