//! Mera content build tool
//!
//! Validates a content tree (lessons, menus, domains, curriculum) against
//! the registered component types and exports the generated query surface.
//!
//! Usage:
//!   mera validate ./content
//!   mera export ./content --out build/surface.json

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mera_curriculum::{Catalog, DiagnosticReport};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "mera")]
#[command(about = "Validate Mera content and export its query surface")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// TOML file overriding the content directory layout
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a content tree and report every problem
    Validate {
        /// Content root
        root: PathBuf,
    },
    /// Validate, then write the query surface as JSON
    Export {
        /// Content root
        root: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "surface.json")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let layout = mera_cli::load_layout(args.layout.as_deref())?;
    match args.command {
        Command::Validate { root } => {
            let catalog = checked(mera_cli::validate(&root, &layout)?)?;
            info!(
                entities = catalog.graph.entity_count(),
                components = catalog.graph.component_count(),
                "Content is valid"
            );
        }
        Command::Export { root, out } => {
            let catalog = checked(mera_cli::validate(&root, &layout)?)?;
            mera_cli::export(&catalog, &out)?;
        }
    }
    Ok(())
}

/// Prints diagnostics and turns a failed validation into an error exit.
fn checked(result: Result<Catalog, DiagnosticReport>) -> Result<Catalog> {
    match result {
        Ok(catalog) => {
            for warning in &catalog.warnings {
                warn!("{warning}");
            }
            Ok(catalog)
        }
        Err(report) => {
            eprint!("{report}");
            bail!("content failed validation with {} error(s)", report.errors().count())
        }
    }
}
