//! Built-in strategies — the enumerable set behind the `Strategy` seam.
//!
//! The production analysis pipeline (indicators, scoring, AI confirmation)
//! is an external collaborator. These implementations are deliberately small
//! and exist to exercise the full signal→order→fill path from configuration
//! alone.

use coinlab_core::domain::{Candle, Direction, Signal};
use coinlab_core::strategy::Strategy;

/// Never signals. Useful as a zero-trade baseline: the run still produces a
/// valid report with zero-valued trade statistics.
#[derive(Debug, Clone, Copy)]
pub struct NullStrategy;

impl Strategy for NullStrategy {
    fn name(&self) -> &str {
        "null"
    }

    fn evaluate(&mut self, _window: &[Candle], _symbol: &str, _timeframe: &str) -> Option<Signal> {
        None
    }
}

/// Channel breakout: a close above the prior `lookback`-bar high buys with a
/// stop at the prior `lookback`-bar low.
#[derive(Debug, Clone, Copy)]
pub struct BreakoutStrategy {
    lookback: usize,
}

impl BreakoutStrategy {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "lookback must be >= 1");
        Self { lookback }
    }
}

impl Strategy for BreakoutStrategy {
    fn name(&self) -> &str {
        "breakout"
    }

    fn evaluate(&mut self, window: &[Candle], symbol: &str, _timeframe: &str) -> Option<Signal> {
        if window.len() < self.lookback + 1 {
            return None;
        }
        let (history, current) = window.split_at(window.len() - 1);
        let current = &current[0];
        let channel = &history[history.len() - self.lookback..];

        let channel_high = channel.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let channel_low = channel.iter().map(|c| c.low).fold(f64::MAX, f64::min);

        if current.close > channel_high {
            Some(Signal {
                timestamp: current.timestamp,
                symbol: symbol.to_string(),
                direction: Direction::Buy,
                entry_price: current.close,
                stop_loss: channel_low,
                targets: Vec::new(),
                risk_reward_ratio: None,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn base_time() -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn candle(offset: i64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: base_time() + Duration::hours(offset),
            open: close,
            high,
            low,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn null_strategy_never_signals() {
        let window = vec![candle(0, 101.0, 99.0, 100.0)];
        assert!(NullStrategy.evaluate(&window, "BTC/USDT", "1h").is_none());
    }

    #[test]
    fn breakout_signals_on_new_high_close() {
        let mut strategy = BreakoutStrategy::new(3);
        let window = vec![
            candle(0, 101.0, 99.0, 100.0),
            candle(1, 102.0, 98.0, 100.5),
            candle(2, 101.5, 99.5, 100.2),
            candle(3, 103.5, 100.0, 103.0), // close above prior high of 102
        ];

        let signal = strategy.evaluate(&window, "BTC/USDT", "1h").unwrap();
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.entry_price, 103.0);
        assert_eq!(signal.stop_loss, 98.0);
        assert_eq!(signal.timestamp, window[3].timestamp);
    }

    #[test]
    fn breakout_quiet_when_inside_channel() {
        let mut strategy = BreakoutStrategy::new(3);
        let window = vec![
            candle(0, 101.0, 99.0, 100.0),
            candle(1, 102.0, 98.0, 100.5),
            candle(2, 101.5, 99.5, 100.2),
            candle(3, 101.8, 100.0, 101.0), // inside the channel
        ];
        assert!(strategy.evaluate(&window, "BTC/USDT", "1h").is_none());
    }

    #[test]
    fn breakout_needs_enough_history() {
        let mut strategy = BreakoutStrategy::new(10);
        let window = vec![candle(0, 101.0, 99.0, 100.0)];
        assert!(strategy.evaluate(&window, "BTC/USDT", "1h").is_none());
    }
}
