//! mirage - headless driver for the mirage book teleport core
//!
//! Builds an in-memory world from a TOML config, runs the scripted trips and
//! reports every placement.

mod config;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use config::MirageConfig;
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a scripted mirage book scenario", long_about = None)]
struct Args {
    /// Scenario config; without it `config/mirage.toml` is tried, then defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,
    /// Write one JSON line per scenario step
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Write the player's teleport record blob
    #[arg(long)]
    record_out: Option<PathBuf>,
    /// Write the effective config as TOML and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // INFO by default, overridable via RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting mirage v{}", env!("CARGO_PKG_VERSION"));
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => MirageConfig::load_strict(path)?,
        None => MirageConfig::load(),
    };

    if let Some(path) = &args.dump_config {
        cfg.save_to_path(path)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        info!(path = %path.display(), "wrote effective config");
        return Ok(());
    }

    let seed = cfg.effective_seed(args.seed);
    let report = scenario::run(&cfg, seed)?;
    for event in &report.events {
        match (&event.placement, &event.rejected) {
            (Some(placement), _) => info!(
                step = event.step,
                action = %event.action,
                to = %placement.dimension,
                pos = %placement.pos,
                strategy = ?placement.strategy,
                attempts = placement.search_attempts,
                "placed"
            ),
            (None, Some(reason)) => {
                info!(step = event.step, action = %event.action, %reason, "rejected")
            }
            (None, None) => {}
        }
    }
    info!(
        seed = report.seed,
        spawn = %report.spawn,
        steps = report.events.len(),
        teleports = report.teleports(),
        "scenario finished"
    );

    if let Some(path) = &args.trace {
        write_file(path, report.to_jsonl()?.as_bytes())?;
        info!(path = %path.display(), "wrote trace");
    }
    if let Some(path) = &args.record_out {
        let blob = report.record.serialize()?;
        write_file(path, &blob)?;
        info!(path = %path.display(), bytes = blob.len(), "wrote teleport record");
    }

    Ok(())
}

fn write_file(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
