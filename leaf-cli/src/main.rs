//! Leaf: compose named templates from fragments.
//!
//! # Usage
//!
//! ```text
//! leaf [--manifest leaf.yaml] check
//! leaf [--manifest leaf.yaml] list
//! leaf [--manifest leaf.yaml] render <name> [--data data.json]
//! ```
//!
//! Set `RUST_LOG=debug` to trace fragment loads and template resolution.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, list::ListArgs, render::RenderArgs};
use leaf_registry::DEFAULT_MANIFEST;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "leaf",
    version,
    about = "Compose, check and render named templates from fragments",
    long_about = None,
)]
struct Cli {
    /// Path to the manifest describing templates and their fragments.
    #[arg(long, short = 'm', global = true, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve every template; fail on the first broken one.
    Check(CheckArgs),

    /// List declared templates and their fragments.
    List(ListArgs),

    /// Render one template to stdout.
    Render(RenderArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => args.run(&cli.manifest),
        Commands::List(args) => args.run(&cli.manifest),
        Commands::Render(args) => args.run(&cli.manifest),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
