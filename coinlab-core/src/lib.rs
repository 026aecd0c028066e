//! Coinlab core — the backtesting simulation engine.
//!
//! The heart of the system:
//! - Domain types (candles, signals, orders, fills, positions, trades)
//! - Data refinery: load, validate, clean, and cache historical candles
//! - Fixed-fractional position sizing
//! - Portfolio: per-symbol position state machine and equity accounting
//! - Broker: no-look-ahead execution with slippage and commission
//! - Performance metrics and the final report
//! - Deterministic seed derivation for execution randomness
//! - The `Strategy` seam to the external analysis pipeline

pub mod broker;
pub mod domain;
pub mod metrics;
pub mod portfolio;
pub mod refinery;
pub mod rng;
pub mod sizer;
pub mod strategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync, so a batch runner can
    /// process independent (symbol, timeframe) runs on worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Series>();
        require_sync::<domain::Series>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Fill>();
        require_sync::<domain::Fill>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::ClosedTrade>();
        require_sync::<domain::ClosedTrade>();
        require_send::<domain::EquityCurve>();
        require_sync::<domain::EquityCurve>();

        require_send::<portfolio::Portfolio>();
        require_sync::<portfolio::Portfolio>();
        require_send::<broker::Broker>();
        require_sync::<broker::Broker>();
        require_send::<refinery::DataRefinery>();
        require_sync::<refinery::DataRefinery>();
        require_send::<rng::SeedHierarchy>();
        require_sync::<rng::SeedHierarchy>();
        require_send::<metrics::PerformanceReport>();
        require_sync::<metrics::PerformanceReport>();
    }

    /// Architecture contract: the `Strategy` trait does NOT accept the
    /// portfolio.
    ///
    /// `evaluate()` takes the candle window, symbol, and timeframe — nothing
    /// else. Strategies cannot see account state, so signal generation can
    /// never depend on position or cash. The type system enforces this; the
    /// test exists to break loudly if the trait signature ever changes.
    #[test]
    fn strategy_trait_has_no_portfolio_parameter() {
        fn _check_trait_object_builds(
            strategy: &mut dyn strategy::Strategy,
            window: &[domain::Candle],
        ) -> Option<domain::Signal> {
            strategy.evaluate(window, "BTC/USDT", "1h")
        }
    }
}
