//! Position — an open holding, at most one per symbol.

use super::signal::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open position, created by the fill that opened it and destroyed by the
/// fill that closes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub entry_price: f64,
    pub quantity: f64,
    pub direction: Direction,
    pub entry_time: DateTime<Utc>,
    /// Last known market value; refreshed on every mark-to-market.
    pub market_value: f64,
}

impl Position {
    /// Refresh the market value from the latest price.
    pub fn mark(&mut self, price: f64) {
        self.market_value = self.quantity * price;
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.quantity * self.direction.sign()
    }
}
