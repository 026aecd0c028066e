//! Serializable backtest configuration.
//!
//! A single TOML file drives a batch: data location, symbol/timeframe
//! universe, account and friction parameters, warm-up length, master seed,
//! and the strategy to evaluate.

use crate::strategies::{BreakoutStrategy, NullStrategy};
use coinlab_core::broker::ExecutionConfig;
use coinlab_core::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one batch of backtests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    /// Directory holding one CSV file per (symbol, timeframe) pair.
    pub data_dir: PathBuf,

    /// Symbols to simulate (exchange notation, e.g. `BTC/USDT`).
    pub symbols: Vec<String>,

    /// Timeframes to simulate (e.g. `1h`, `4h`).
    pub timeframes: Vec<String>,

    /// Starting account equity.
    #[serde(default = "default_initial_equity")]
    pub initial_equity: f64,

    /// Percentage of equity risked per trade.
    #[serde(default = "default_risk_per_trade_pct")]
    pub risk_per_trade_pct: f64,

    /// Commission as a percentage of traded notional.
    #[serde(default = "default_commission_pct")]
    pub commission_pct: f64,

    /// Fixed slippage as a fraction of the fill price.
    #[serde(default = "default_base_slippage_pct")]
    pub base_slippage_pct: f64,

    /// Fraction of the signal candle's ATR added as randomized slippage.
    #[serde(default = "default_atr_slippage_multiplier")]
    pub atr_slippage_multiplier: f64,

    /// ATR lookback in candles.
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Bars consumed before the first strategy decision, so indicator state
    /// is stable when trading starts.
    #[serde(default = "default_warmup_bars")]
    pub warmup_bars: usize,

    /// Master seed for slippage randomness; per-run RNGs derive from it.
    #[serde(default)]
    pub master_seed: u64,

    #[serde(default)]
    pub strategy: StrategyConfig,
}

fn default_initial_equity() -> f64 {
    10_000.0
}
fn default_risk_per_trade_pct() -> f64 {
    1.0
}
fn default_commission_pct() -> f64 {
    0.06
}
fn default_base_slippage_pct() -> f64 {
    0.0002
}
fn default_atr_slippage_multiplier() -> f64 {
    0.1
}
fn default_atr_period() -> usize {
    14
}
fn default_warmup_bars() -> usize {
    300
}

impl BacktestConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("symbols must not be empty".into()));
        }
        if self.timeframes.is_empty() {
            return Err(ConfigError::Invalid("timeframes must not be empty".into()));
        }
        if self.initial_equity <= 0.0 {
            return Err(ConfigError::Invalid("initial_equity must be positive".into()));
        }
        if !(0.0..=100.0).contains(&self.risk_per_trade_pct) || self.risk_per_trade_pct == 0.0 {
            return Err(ConfigError::Invalid(
                "risk_per_trade_pct must be in (0, 100]".into(),
            ));
        }
        if self.commission_pct < 0.0 {
            return Err(ConfigError::Invalid("commission_pct must not be negative".into()));
        }
        if self.base_slippage_pct < 0.0 || self.atr_slippage_multiplier < 0.0 {
            return Err(ConfigError::Invalid("slippage parameters must not be negative".into()));
        }
        if self.warmup_bars == 0 {
            return Err(ConfigError::Invalid("warmup_bars must be at least 1".into()));
        }
        Ok(())
    }

    /// Broker friction parameters for this config.
    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            base_slippage_pct: self.base_slippage_pct,
            atr_slippage_multiplier: self.atr_slippage_multiplier,
            atr_period: self.atr_period,
            commission_pct: self.commission_pct,
        }
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two identical configs produce the same id, so results can be compared
    /// or cached across runs.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// The enumerable strategy set (serializable).
///
/// The production analysis/strategy pipeline lives behind the `Strategy`
/// trait; these are the built-in implementations the runner can construct
/// from configuration alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    /// Never signals; produces a clean zero-trade baseline.
    Null,

    /// Channel breakout: a close above the prior `lookback`-bar high buys
    /// with a stop at the prior `lookback`-bar low.
    Breakout { lookback: usize },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Breakout { lookback: 20 }
    }
}

impl StrategyConfig {
    pub fn build(&self) -> Box<dyn Strategy + Send> {
        match self {
            Self::Null => Box::new(NullStrategy),
            Self::Breakout { lookback } => Box::new(BreakoutStrategy::new(*lookback)),
        }
    }
}
