//! Fill — the broker's execution report, sole mutator of portfolio state.

use super::signal::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An executed order.
///
/// The timestamp is the execution candle's own time, which by the
/// no-look-ahead guarantee is strictly later than the signal candle's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
    pub quantity: f64,
    pub fill_price: f64,
    pub commission: f64,
}
