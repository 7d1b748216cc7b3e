//! YAML manifest describing a registry on disk.
//!
//! ```yaml
//! root: templates        # fragment directory, relative to the manifest
//! cache: true            # read each fragment from disk only once
//! templates:
//!   page: [base.html, header.html, footer.html, main.html]
//! ```
//!
//! Loading a manifest reads only the manifest itself; fragments are read when
//! templates resolve.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use leaf_core::{CachingSource, FileSource};

use crate::error::ManifestError;
use crate::registry::Registry;

/// Conventional manifest file name.
pub const DEFAULT_MANIFEST: &str = "leaf.yaml";

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Declarative registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Fragment directory. Relative paths resolve against the manifest's
    /// directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Wrap the file source in a [`CachingSource`].
    #[serde(default)]
    pub cache: bool,

    /// Template name → fragment names, in merge order.
    #[serde(default)]
    pub templates: BTreeMap<String, Vec<String>>,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            root: default_root(),
            cache: false,
            templates: BTreeMap::new(),
        }
    }
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    ///
    /// Returns [`ManifestError::NotFound`] if absent and
    /// [`ManifestError::Parse`] (with path + line context) if malformed.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::NotFound { path: path.to_path_buf() });
            }
            Err(source) => {
                return Err(ManifestError::Io { path: path.to_path_buf(), source });
            }
        };
        serde_yaml::from_str(&contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fragment directory, resolved against `base_dir` when relative.
    pub fn root_dir(&self, base_dir: &Path) -> PathBuf {
        if self.root.is_absolute() {
            self.root.clone()
        } else {
            base_dir.join(&self.root)
        }
    }

    /// Build a registry over the fragment directory and define every
    /// template listed in the manifest.
    pub fn to_registry(&self, base_dir: &Path) -> Registry {
        let files = FileSource::new(self.root_dir(base_dir));
        let registry = if self.cache {
            Registry::new(CachingSource::new(files))
        } else {
            Registry::new(files)
        };
        for (name, fragments) in &self.templates {
            registry.define(name.clone(), fragments.iter().cloned());
        }
        registry
    }
}
