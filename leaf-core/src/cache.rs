//! [`CachingSource`]: memoizes successful loads of a wrapped [`Source`].
//!
//! The cache is append-only: an entry is stored the first time a name loads
//! successfully and is never evicted. Failures are never stored, so a later
//! call for the same name goes back to the wrapped source.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::SourceError;
use crate::source::Source;

/// Decorates a [`Source`] so each name is read from it at most once.
#[derive(Debug)]
pub struct CachingSource<S> {
    inner: S,
    cache: Mutex<HashMap<String, Vec<u8>>>,
}

impl<S: Source> CachingSource<S> {
    pub fn new(inner: S) -> Self {
        CachingSource {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped source. Loading through it bypasses the cache.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached fragments.
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` has been cached.
    pub fn contains(&self, name: &str) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

impl<S: Source> Source for CachingSource<S> {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        // Held across the delegate call: check-then-insert must be atomic.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bytes) = cache.get(name) {
            tracing::trace!(fragment = name, "fragment cache hit");
            return Ok(bytes.clone());
        }

        let bytes = self.inner.load(name)?;
        tracing::debug!(fragment = name, len = bytes.len(), "fragment cached");
        cache.insert(name.to_owned(), bytes.clone());
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
