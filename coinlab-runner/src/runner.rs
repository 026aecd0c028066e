//! Simulation runner — the strictly sequential bar-by-bar control loop.
//!
//! Per bar: mark the portfolio to market, ask the strategy for a signal,
//! route it portfolio → broker → portfolio. Signal handling for bar i
//! completes (or is rejected) before bar i+1 is processed; that ordering is
//! what makes the no-look-ahead guarantee meaningful.

use chrono::{DateTime, Utc};
use coinlab_core::broker::Broker;
use coinlab_core::domain::{ClosedTrade, EquityCurve, Fill};
use coinlab_core::metrics::PerformanceReport;
use coinlab_core::portfolio::Portfolio;
use coinlab_core::refinery::DataRefinery;
use coinlab_core::rng::SeedHierarchy;
use coinlab_core::strategy::Strategy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{BacktestConfig, ConfigError};

/// Reasons a single run was skipped. A batch logs these and moves on.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no usable data for {symbol}@{timeframe}")]
    DataUnavailable { symbol: String, timeframe: String },

    #[error("not enough data for {symbol}@{timeframe}: required {required}, available {available}")]
    InsufficientData {
        symbol: String,
        timeframe: String,
        required: usize,
        available: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Complete result of one (symbol, timeframe) backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub symbol: String,
    pub timeframe: String,
    /// First and last simulated bar timestamps (warm-up excluded).
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub bars: usize,
    pub signal_count: usize,
    pub report: PerformanceReport,
    pub fills: Vec<Fill>,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: EquityCurve,
}

/// Run one deterministic pass over a single (symbol, timeframe) series.
pub fn run_backtest(
    config: &BacktestConfig,
    refinery: &mut DataRefinery,
    strategy: &mut dyn Strategy,
    symbol: &str,
    timeframe: &str,
) -> Result<RunSummary, RunnerError> {
    config.validate()?;

    let series = match refinery.load(symbol, timeframe) {
        Some(series) => series,
        None => {
            warn!(symbol, timeframe, "backtest skipped; data loading failed");
            return Err(RunnerError::DataUnavailable {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            });
        }
    };

    if series.len() <= config.warmup_bars {
        warn!(
            symbol,
            timeframe,
            required = config.warmup_bars + 1,
            available = series.len(),
            "backtest skipped; not enough data for warm-up"
        );
        return Err(RunnerError::InsufficientData {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            required: config.warmup_bars + 1,
            available: series.len(),
        });
    }

    info!(
        symbol,
        timeframe,
        bars = series.len(),
        warmup = config.warmup_bars,
        strategy = strategy.name(),
        "starting simulation"
    );

    let mut portfolio = Portfolio::new(config.initial_equity, config.risk_per_trade_pct);
    let seeds = SeedHierarchy::new(config.master_seed);
    let mut broker = Broker::new(config.execution(), seeds.rng_for(symbol, timeframe));

    let candles = series.candles();
    let mut prices: HashMap<String, f64> = HashMap::with_capacity(1);
    let mut fills: Vec<Fill> = Vec::new();
    let mut signal_count = 0usize;

    for i in config.warmup_bars..candles.len() {
        let candle = &candles[i];

        prices.insert(symbol.to_string(), candle.close);
        portfolio.on_candle(candle.timestamp, &prices);

        // The strategy only ever sees history up to and including bar i.
        let window = &candles[..=i];
        if let Some(signal) = strategy.evaluate(window, symbol, timeframe) {
            signal_count += 1;
            if let Some(order) = portfolio.on_signal(&signal) {
                if let Some(fill) = broker.execute(&order, &series, candle.timestamp) {
                    portfolio.on_fill(&fill);
                    fills.push(fill);
                }
            }
        }
    }

    let report = portfolio.generate_report();
    info!(symbol, timeframe, "simulation complete");

    Ok(RunSummary {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        start: candles[config.warmup_bars].timestamp,
        end: candles[candles.len() - 1].timestamp,
        bars: candles.len() - config.warmup_bars,
        signal_count,
        report,
        fills,
        trades: portfolio.closed_trades().to_vec(),
        equity_curve: portfolio.equity_curve().clone(),
    })
}

/// Run every configured (symbol, timeframe) pair.
///
/// Runs are fully independent — each gets its own refinery, portfolio,
/// broker, and strategy instance — so they execute in parallel. A run that
/// cannot load enough data is logged and skipped, never aborting the batch.
/// Broker RNGs derive from the master seed per pair, so results do not
/// depend on scheduling order.
pub fn run_batch(config: &BacktestConfig) -> Vec<RunSummary> {
    let pairs: Vec<(&str, &str)> = config
        .symbols
        .iter()
        .flat_map(|s| config.timeframes.iter().map(move |t| (s.as_str(), t.as_str())))
        .collect();

    let mut summaries: Vec<RunSummary> = pairs
        .par_iter()
        .filter_map(|&(symbol, timeframe)| {
            let mut refinery = DataRefinery::new(&config.data_dir);
            let mut strategy = config.strategy.build();
            match run_backtest(config, &mut refinery, strategy.as_mut(), symbol, timeframe) {
                Ok(summary) => Some(summary),
                Err(err) => {
                    warn!(reason = %err, "run skipped");
                    None
                }
            }
        })
        .collect();

    // Deterministic output order regardless of worker scheduling.
    summaries.sort_by(|a, b| (&a.symbol, &a.timeframe).cmp(&(&b.symbol, &b.timeframe)));
    summaries
}
