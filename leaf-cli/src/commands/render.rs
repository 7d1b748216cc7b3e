//! `leaf render <name>`: resolve one template and render it to stdout.
//!
//! Only the named template's fragments are loaded; other manifest entries
//! are not resolved, so a broken sibling does not block rendering.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use super::load_manifest;

/// Arguments for `leaf render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template name to render.
    pub name: String,

    /// JSON file whose top-level object becomes the template variables.
    #[arg(long, short = 'd', value_name = "FILE")]
    pub data: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self, manifest_path: &Path) -> Result<()> {
        let data = match &self.data {
            Some(path) => read_data(path)?,
            None => Value::Null,
        };

        let (manifest, base_dir) = load_manifest(manifest_path)?;
        let registry = manifest.to_registry(&base_dir);

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        registry
            .execute(&self.name, &mut out, &data)
            .with_context(|| format!("render failed for '{}'", self.name))?;
        out.flush()?;
        Ok(())
    }
}

fn read_data(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read data file '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid JSON in '{}'", path.display()))
}
