#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that auto-plays Macrodata levels headlessly.

mod autoplay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use macrodata_session::{Session, SessionConfig};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the headless Macrodata runner.
#[derive(Debug, Parser)]
#[command(name = "macrodata")]
#[command(about = "Auto-plays Macrodata levels and reports their outcome")]
struct CliArgs {
    /// Number of levels to play back to back.
    #[arg(long, default_value_t = 1)]
    levels: u32,
    /// Seed for the session RNG; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Rows and columns of the grid; overrides the config file.
    #[arg(long)]
    size: Option<u32>,
    /// TOML file with session parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print reports as JSON instead of one summary line per level.
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Entry point for the Macrodata command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = resolve_config(&args)?;
    let mut session = Session::new(config).context("failed to start session")?;
    let reports = autoplay::play_levels(&mut session, args.levels).context("auto-play failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("failed to encode reports")?;
        println!("{json}");
    } else {
        for report in &reports {
            println!("{}", report.summary());
        }
    }
    Ok(())
}

fn resolve_config(args: &CliArgs) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(size) = args.size {
        config.grid_size = size;
    }
    config.validate().context("invalid session config")?;
    Ok(config)
}
