//! `leaf list`: show what the manifest declares, without loading fragments.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::load_manifest;

/// Arguments for `leaf list`.
#[derive(Args, Debug)]
pub struct ListArgs {}

impl ListArgs {
    pub fn run(self, manifest_path: &Path) -> Result<()> {
        let (manifest, base_dir) = load_manifest(manifest_path)?;

        if manifest.templates.is_empty() {
            println!("No templates declared in '{}'.", manifest_path.display());
            return Ok(());
        }

        println!("root: {}", manifest.root_dir(&base_dir).display());
        for (name, fragments) in &manifest.templates {
            println!("{}: {}", name.bold(), fragments.join(", "));
        }
        Ok(())
    }
}
