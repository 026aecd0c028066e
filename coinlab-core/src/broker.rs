//! Broker — simulated order execution against historical candles.
//!
//! The no-look-ahead rule: an order generated from candle T can never fill on
//! or before candle T. It fills at the open of candle T+1, or not at all.
//! Slippage has a fixed component plus a randomized component scaled by the
//! signal candle's ATR; both always move the fill price against the trader.

use crate::domain::{Candle, Fill, Order, Series};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, warn};

/// Execution friction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    /// Fixed slippage as a fraction of the fill price (0.0002 = 2 bps).
    pub base_slippage_pct: f64,
    /// Fraction of the signal candle's ATR added as randomized slippage.
    pub atr_slippage_multiplier: f64,
    /// ATR lookback in candles.
    pub atr_period: usize,
    /// Commission as a percentage of traded notional (0.06 = 0.06%).
    pub commission_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            base_slippage_pct: 0.0002,
            atr_slippage_multiplier: 0.1,
            atr_period: 14,
            commission_pct: 0.06,
        }
    }
}

/// Order execution simulator.
///
/// Stateless apart from its friction parameters and the injected RNG; a pure
/// transformer of (order, series) into a fill. The RNG is injected so runs
/// are reproducible from a seed.
#[derive(Debug, Clone)]
pub struct Broker {
    config: ExecutionConfig,
    rng: StdRng,
}

impl Broker {
    pub fn new(config: ExecutionConfig, rng: StdRng) -> Self {
        Self { config, rng }
    }

    pub fn from_seed(config: ExecutionConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Execute a market order against the series, or drop it with a logged
    /// reason.
    ///
    /// `signal_timestamp` names the candle that generated the signal; the
    /// fill, if any, lands on the immediately following candle at its open
    /// plus adverse slippage. The fill's timestamp is the execution candle's
    /// own, strictly later than the signal candle's.
    pub fn execute(
        &mut self,
        order: &Order,
        series: &Series,
        signal_timestamp: DateTime<Utc>,
    ) -> Option<Fill> {
        let signal_index = match series.index_of(signal_timestamp) {
            Some(index) => index,
            None => {
                error!(
                    symbol = %order.symbol,
                    timeframe = %series.timeframe,
                    %signal_timestamp,
                    "signal timestamp not found in series; order dropped"
                );
                return None;
            }
        };

        let execution_candle = match series.get(signal_index + 1) {
            Some(candle) => candle,
            None => {
                warn!(
                    symbol = %order.symbol,
                    %signal_timestamp,
                    "order cannot be filled; end of data series"
                );
                return None;
            }
        };

        let mut fill_price = execution_candle.open;

        let base_slippage = fill_price * self.config.base_slippage_pct;
        let dynamic_slippage = match atr(
            &series.candles()[..=signal_index],
            self.config.atr_period,
        ) {
            Some(atr_value) => {
                atr_value * self.config.atr_slippage_multiplier * self.rng.gen_range(0.5..=1.5)
            }
            None => 0.0,
        };
        // Adverse in both directions: buys pay up, sells receive less.
        fill_price += (base_slippage + dynamic_slippage) * order.direction.sign();

        let commission = order.quantity * fill_price * (self.config.commission_pct / 100.0);

        debug!(
            symbol = %order.symbol,
            direction = %order.direction,
            quantity = order.quantity,
            fill_price,
            commission,
            "executing market order"
        );

        Some(Fill {
            timestamp: execution_candle.timestamp,
            symbol: order.symbol.clone(),
            direction: order.direction,
            quantity: order.quantity,
            fill_price,
            commission,
        })
    }
}

/// Average True Range over the trailing `period` candles (simple average of
/// true ranges). `None` when fewer than `period` candles are available.
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let recent = &candles[candles.len() - period..];
    let mut sum_tr = 0.0;
    for (i, candle) in recent.iter().enumerate() {
        let prev_close = if i > 0 { Some(recent[i - 1].close) } else { None };
        sum_tr += candle.true_range(prev_close);
    }
    Some(sum_tr / period as f64)
}
