pub mod check;
pub mod list;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use leaf_registry::Manifest;

/// Load the manifest at `path` along with the directory its relative paths
/// resolve against.
pub(crate) fn load_manifest(path: &Path) -> Result<(Manifest, PathBuf)> {
    let manifest = Manifest::load(path)
        .with_context(|| format!("cannot load manifest '{}'", path.display()))?;
    let base_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tracing::debug!(
        manifest = %path.display(),
        templates = manifest.templates.len(),
        "manifest loaded"
    );
    Ok((manifest, base_dir))
}
