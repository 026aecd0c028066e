//! Order — what the portfolio asks the broker to execute.

use super::signal::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order types supported by the simulator.
///
/// v1 issues market orders only; they fill at the open of the candle after
/// the signal candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
}

/// A sized order, created by the portfolio from a signal.
///
/// The timestamp is the signal's: it names the candle that generated the
/// order, not the candle it will fill on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
    pub quantity: f64,
    pub order_type: OrderType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_wire_value() {
        assert_eq!(serde_json::to_string(&OrderType::Market).unwrap(), "\"MARKET\"");
    }

    #[test]
    fn order_serialization_roundtrip() {
        let order = Order {
            timestamp: chrono::DateTime::parse_from_rfc3339("2024-01-02T03:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            symbol: "ETH/USDT".into(),
            direction: Direction::Buy,
            quantity: 1.25,
            order_type: OrderType::Market,
        };
        let json = serde_json::to_string(&order).unwrap();
        let deser: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order.symbol, deser.symbol);
        assert_eq!(order.quantity, deser.quantity);
        assert_eq!(deser.order_type, OrderType::Market);
    }
}
