//! Portfolio — account state and the per-symbol position state machine.
//!
//! Owns cash, open positions, closed trades, and the equity curve. Signals
//! become orders here (or get rejected); fills are the only thing that
//! mutates position/cash state. The accounting identity holds after every
//! call: `total_equity == cash + Σ open position market values`.

use crate::domain::{ClosedTrade, EquityCurve, Fill, Order, OrderType, Position, Signal};
use crate::metrics::PerformanceReport;
use crate::sizer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Account state for one backtest run.
///
/// Per-symbol state machine: Flat → (fill opens) → Open → (fill closes) →
/// Flat, with at most one open position per symbol. A signal for a symbol
/// that is already Open is rejected — a v1 policy choice, not a
/// pyramiding/partial-close model.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    initial_equity: f64,
    risk_per_trade_pct: f64,
    open_positions: HashMap<String, Position>,
    closed_trades: Vec<ClosedTrade>,
    equity_curve: EquityCurve,
}

impl Portfolio {
    pub fn new(initial_equity: f64, risk_per_trade_pct: f64) -> Self {
        Self {
            cash: initial_equity,
            initial_equity,
            risk_per_trade_pct,
            open_positions: HashMap::new(),
            closed_trades: Vec::new(),
            equity_curve: EquityCurve::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_equity(&self) -> f64 {
        self.initial_equity
    }

    pub fn open_positions(&self) -> &HashMap<String, Position> {
        &self.open_positions
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed_trades
    }

    pub fn equity_curve(&self) -> &EquityCurve {
        &self.equity_curve
    }

    /// Latest recorded total equity, before the first mark-to-market the
    /// initial equity.
    pub fn total_equity(&self) -> f64 {
        self.equity_curve.last_equity().unwrap_or(self.initial_equity)
    }

    /// Mark every open position to market and record an equity point.
    ///
    /// Positions whose symbol is missing from `prices` keep their last known
    /// market value. Never fails. Calling twice for the same timestamp
    /// records exactly one point.
    pub fn on_candle(&mut self, timestamp: DateTime<Utc>, prices: &HashMap<String, f64>) {
        let mut position_value = 0.0;
        for (symbol, position) in self.open_positions.iter_mut() {
            if let Some(&price) = prices.get(symbol) {
                position.mark(price);
            }
            position_value += position.market_value;
        }
        self.equity_curve.observe(timestamp, self.cash + position_value);
    }

    /// Turn a signal into a sized market order, or reject it.
    ///
    /// Rejections (already-open symbol, unsizeable risk) are logged and
    /// return `None`; they are expected control flow, not errors.
    pub fn on_signal(&self, signal: &Signal) -> Option<Order> {
        if self.open_positions.contains_key(&signal.symbol) {
            debug!(symbol = %signal.symbol, "signal ignored; position already open");
            return None;
        }

        let quantity = sizer::fixed_fractional(
            self.total_equity(),
            self.risk_per_trade_pct,
            signal.entry_price,
            signal.stop_loss,
        );
        match quantity {
            Some(quantity) if quantity > 0.0 => Some(Order {
                timestamp: signal.timestamp,
                symbol: signal.symbol.clone(),
                direction: signal.direction,
                quantity,
                order_type: OrderType::Market,
            }),
            _ => {
                warn!(symbol = %signal.symbol, "order aborted due to invalid position size");
                None
            }
        }
    }

    /// Apply an execution report: mutate cash, then open or close the
    /// symbol's position.
    pub fn on_fill(&mut self, fill: &Fill) {
        let sign = fill.direction.sign();
        self.cash -= fill.fill_price * fill.quantity * sign;
        self.cash -= fill.commission;

        if let Some(position) = self.open_positions.remove(&fill.symbol) {
            // Closing fill: realized PnL uses the closing direction's sign,
            // consistent with the cash mutation above.
            let pnl = (fill.fill_price - position.entry_price) * fill.quantity * sign;
            info!(symbol = %fill.symbol, pnl, "closed position");
            self.closed_trades.push(ClosedTrade::from_fill(fill, pnl));
        } else {
            info!(
                symbol = %fill.symbol,
                direction = %fill.direction,
                quantity = fill.quantity,
                fill_price = fill.fill_price,
                "opened new position"
            );
            self.open_positions.insert(
                fill.symbol.clone(),
                Position {
                    symbol: fill.symbol.clone(),
                    entry_price: fill.fill_price,
                    quantity: fill.quantity,
                    direction: fill.direction,
                    entry_time: fill.timestamp,
                    market_value: fill.quantity * fill.fill_price,
                },
            );
        }
    }

    /// Final performance report, computed purely from the equity curve and
    /// the closed-trade history.
    pub fn generate_report(&self) -> PerformanceReport {
        PerformanceReport::compute(
            self.initial_equity,
            self.total_equity(),
            &self.equity_curve.equities(),
            &self.closed_trades,
        )
    }
}
