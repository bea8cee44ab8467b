// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impact_engine::config::{load_manifest, RuntimeBuilder};
use impact_engine::engine::PhaseFilter;
use impact_engine::export::write_yaml;

/// Compute a manifest tree and write the results as YAML.
#[derive(Parser)]
#[command(name = "impact-engine")]
#[command(about = "Runs manifest pipelines and aggregates their outputs", long_about = None)]
#[command(version)]
struct Cli {
    /// Manifest file to compute
    #[arg(short, long)]
    manifest: PathBuf,

    /// Output file; results go to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run the observe phase
    #[arg(long)]
    observe: bool,

    /// Run the regroup phase
    #[arg(long)]
    regroup: bool,

    /// Run the compute phase
    #[arg(long)]
    compute: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "IMPACT_ENGINE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let manifest = load_manifest(&cli.manifest)?;
    let runtime = RuntimeBuilder::from_manifest(&manifest)
        .with_context(|| format!("failed to initialize plugins for '{}'", manifest.name))?;

    // no phase switches means every phase runs
    let phases = PhaseFilter {
        observe: cli.observe,
        regroup: cli.regroup,
        compute: cli.compute,
    };
    let computed = runtime
        .run(&manifest, phases)
        .await
        .with_context(|| format!("failed to compute '{}'", cli.manifest.display()))?;

    write_yaml(&manifest, &computed, cli.output.as_deref())?;
    Ok(())
}
