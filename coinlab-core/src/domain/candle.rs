//! Candle and Series — the fundamental market data units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol on a single bar of one timeframe.
///
/// Immutable once loaded: the refinery hands out cleaned candles and nothing
/// downstream rewrites them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any required field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: high >= low, high bounds open and close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// True range against the previous close (plain high-low without one).
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let high_low = self.high - self.low;
        match prev_close {
            Some(pc) => {
                let high_prev = (self.high - pc).abs();
                let low_prev = (self.low - pc).abs();
                high_low.max(high_prev).max(low_prev)
            }
            None => high_low,
        }
    }
}

/// An ordered, deduplicated, gap-tolerant sequence of candles for one
/// (symbol, timeframe) pair.
///
/// Invariant: strictly increasing timestamps, no NaN in required fields.
/// The data refinery is the production constructor and enforces both before
/// a `Series` ever leaves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub timeframe: String,
    candles: Vec<Candle>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>, candles: Vec<Candle>) -> Self {
        debug_assert!(
            candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp),
            "series timestamps must be strictly increasing"
        );
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            candles,
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    /// Index of the candle at exactly `timestamp`, if present.
    pub fn index_of(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        self.candles
            .binary_search_by_key(&timestamp, |c| c.timestamp)
            .ok()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.first().map(|c| c.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.last().map(|c| c.timestamp)
    }
}
