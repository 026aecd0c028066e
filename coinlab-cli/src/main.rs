//! Coinlab CLI — run backtests from a TOML config file.
//!
//! `coinlab run --config backtest.toml` simulates every configured
//! (symbol, timeframe) pair and prints a performance report per run.
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use coinlab_runner::{run_batch, BacktestConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coinlab", about = "coinlab — crypto backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run backtests for every configured symbol/timeframe pair.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Override the historical data directory.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Override the master seed for slippage randomness.
        #[arg(long)]
        seed: Option<u64>,

        /// Print run summaries as JSON instead of formatted reports.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data_dir,
            seed,
            json,
        } => cmd_run(config, data_dir, seed, json),
    }
}

fn cmd_run(
    config_path: PathBuf,
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut config = BacktestConfig::from_toml_path(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(seed) = seed {
        config.master_seed = seed;
    }

    info!(run_id = %config.run_id(), "starting backtest batch");
    let summaries = run_batch(&config);
    if summaries.is_empty() {
        bail!("no backtest produced a result; check the data directory and symbol list");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            println!();
            println!(
                "{} @ {} — {} bars, {} to {}",
                summary.symbol, summary.timeframe, summary.bars, summary.start, summary.end
            );
            println!("{}", summary.report);
        }
    }
    Ok(())
}
