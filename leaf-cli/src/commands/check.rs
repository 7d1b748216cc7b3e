//! `leaf check`: compile every template, as a host would at startup.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::load_manifest;

/// Arguments for `leaf check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print only the summary line.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl CheckArgs {
    pub fn run(self, manifest_path: &Path) -> Result<()> {
        let (manifest, base_dir) = load_manifest(manifest_path)?;
        let registry = manifest.to_registry(&base_dir);

        let container = registry.compile().context("template check failed")?;

        if !self.quiet {
            for name in container.names() {
                let fragments = manifest.templates.get(name).map_or(0, Vec::len);
                println!("{} {name} ({fragments} fragments)", "✓".green().bold());
            }
        }
        println!("{} templates compiled", container.len());
        Ok(())
    }
}
