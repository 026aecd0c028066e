//! ClosedTrade — a closing fill plus its realized PnL, appended permanently.

use super::fill::Fill;
use super::signal::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permanent record of a closed position: the closing fill's fields plus the
/// realized PnL computed when the position was removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
    pub quantity: f64,
    pub fill_price: f64,
    pub commission: f64,
    pub pnl: f64,
}

impl ClosedTrade {
    pub fn from_fill(fill: &Fill, pnl: f64) -> Self {
        Self {
            timestamp: fill.timestamp,
            symbol: fill.symbol.clone(),
            direction: fill.direction,
            quantity: fill.quantity,
            fill_price: fill.fill_price,
            commission: fill.commission,
            pnl,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fill_copies_fill_fields() {
        let fill = Fill {
            timestamp: chrono::DateTime::parse_from_rfc3339("2024-01-02T04:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            symbol: "BTC/USDT".into(),
            direction: Direction::Sell,
            quantity: 0.5,
            fill_price: 42_100.0,
            commission: 12.63,
        };
        let trade = ClosedTrade::from_fill(&fill, 250.0);
        assert_eq!(trade.symbol, fill.symbol);
        assert_eq!(trade.fill_price, fill.fill_price);
        assert_eq!(trade.pnl, 250.0);
        assert!(trade.is_winner());
    }
}
