//! The [`Source`] contract and the stock sources that implement it.
//!
//! A source is a key-addressed byte store. It must tolerate being asked for
//! the same name any number of times; whether it re-reads the backing store
//! on every call is up to the implementation (wrap it in
//! [`CachingSource`](crate::CachingSource) to read each name once).

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{io_err, SourceError};

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Key-addressed store of raw fragment bytes.
pub trait Source: Send + Sync {
    /// Look a fragment up by name.
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError>;
}

impl<S: Source + ?Sized> Source for &S {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).load(name)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).load(name)
    }
}

impl<S: Source + ?Sized> Source for Arc<S> {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        (**self).load(name)
    }
}

// ---------------------------------------------------------------------------
// EmptySource
// ---------------------------------------------------------------------------

/// A source that holds nothing; every lookup is [`SourceError::NotFound`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl Source for EmptySource {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::not_found(name))
    }
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// Reads fragments from files below a root directory.
///
/// Names are relative paths (`partials/header.html`). Every call goes to
/// disk, so edits show up on the next load.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `name` onto a path under the root, refusing anything that could
    /// leave it.
    fn path_for(&self, name: &str) -> Result<PathBuf, SourceError> {
        let rel = Path::new(name);
        let mut has_normal = false;
        for component in rel.components() {
            match component {
                Component::Normal(_) => has_normal = true,
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(SourceError::InvalidName { name: name.to_owned() });
                }
            }
        }
        if !has_normal {
            return Err(SourceError::InvalidName { name: name.to_owned() });
        }
        Ok(self.root.join(rel))
    }
}

impl Source for FileSource {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.path_for(name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::not_found(name))
            }
            Err(e) => Err(io_err(path, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// In-memory fragment store.
///
/// Entries can be replaced through a shared reference, which makes it usable
/// as a hot-reloadable backing store while a registry holds onto it.
#[derive(Debug, Default)]
pub struct MemorySource {
    fragments: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the bytes stored under `name`.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.fragments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), bytes.into());
    }

    /// Remove `name`, returning its previous bytes.
    pub fn remove(&self, name: &str) -> Option<Vec<u8>> {
        self.fragments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn len(&self) -> usize {
        self.fragments.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> FromIterator<(K, V)> for MemorySource
where
    K: Into<String>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fragments = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        MemorySource { fragments: RwLock::new(fragments) }
    }
}

impl Source for MemorySource {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        self.fragments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::not_found(name))
    }
}

// ---------------------------------------------------------------------------
// FnSource
// ---------------------------------------------------------------------------

/// Adapts a lookup function, e.g. the accessor of an embedded asset bundle.
pub struct FnSource<F> {
    lookup: F,
}

impl<F> FnSource<F>
where
    F: Fn(&str) -> Result<Vec<u8>, SourceError> + Send + Sync,
{
    pub fn new(lookup: F) -> Self {
        FnSource { lookup }
    }
}

impl<F> Source for FnSource<F>
where
    F: Fn(&str) -> Result<Vec<u8>, SourceError> + Send + Sync,
{
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        (self.lookup)(name)
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
