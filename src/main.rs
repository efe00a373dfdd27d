//! glassmesh - connected glass model baking
//!
//! Headless driver that decorates every glass variant and warms its quad caches.

mod bake;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::GlassMeshConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Connected glass model baking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: config/glassmesh.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decorate every variant and warm its caches from worker threads
    Bake {
        /// Atlas metadata JSON
        #[arg(long)]
        atlas: Option<PathBuf>,

        /// Glass type definitions JSON
        #[arg(long)]
        glass_types: Option<PathBuf>,

        /// Worker threads querying each variant
        #[arg(long)]
        threads: Option<usize>,

        /// Connectivity payloads requested per variant
        #[arg(long)]
        signatures: Option<usize>,

        /// Seed for the connectivity payloads
        #[arg(long)]
        seed: Option<u64>,

        /// Write a JSON metrics report here
        #[arg(long)]
        metrics: Option<PathBuf>,
    },
    /// List registered variants and their render types
    Variants {
        /// Glass type definitions JSON
        #[arg(long)]
        glass_types: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting glassmesh v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => GlassMeshConfig::load_from_path(path),
        None => GlassMeshConfig::load(),
    };

    match cli.command {
        Command::Bake {
            atlas,
            glass_types,
            threads,
            signatures,
            seed,
            metrics,
        } => {
            config.atlas_metadata = atlas.or(config.atlas_metadata);
            config.glass_types = glass_types.or(config.glass_types);
            config.worker_threads = threads.unwrap_or(config.worker_threads);
            config.signatures_per_variant = signatures.unwrap_or(config.signatures_per_variant);
            config.seed = seed.unwrap_or(config.seed);
            config.metrics_output = metrics.or(config.metrics_output);

            let summary = bake::run(&config)?;
            println!(
                "baked {} variants ({} rejected, {} without sprite)",
                summary.metrics.len(),
                summary.rejected,
                summary.skipped
            );
            for metric in &summary.metrics {
                println!(
                    "{:<40} {:<14} entries={:<4} hits={:<6} {}",
                    metric.variant,
                    metric.render_type,
                    metric.entries,
                    metric.hits,
                    metric.hash.get(..16).unwrap_or(&metric.hash)
                );
            }
        }
        Command::Variants { glass_types } => {
            config.glass_types = glass_types.or(config.glass_types);
            let types = bake::load_glass_types(&config)?;
            let overrides = bake::register(&types);
            for (variant, render_type) in overrides.variants() {
                let marker = if overrides.has_override(variant) {
                    "connected"
                } else {
                    "plain"
                };
                println!("{variant:<40} {:<14} {marker}", render_type.as_str());
            }
        }
    }
    Ok(())
}
