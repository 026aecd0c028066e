//! Performance metrics — pure functions over equity values and closed trades.
//!
//! Every metric is equity curve and/or trade list in, scalar out. No
//! dependencies on the portfolio, broker, or runner.

use crate::domain::ClosedTrade;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Periods per year used to annualize the Sharpe ratio. Crypto markets trade
/// every day.
pub const ANNUALIZATION_PERIODS: f64 = 365.0;

/// Final performance metrics for a single backtest run.
///
/// Computed purely from the equity curve and the closed-trade history; a run
/// with zero trades still produces a valid report with zero-valued trade
/// statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub ending_equity: f64,
    pub total_return_pct: f64,
    pub total_trades: usize,
    pub win_rate_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
}

impl PerformanceReport {
    pub fn compute(
        initial_equity: f64,
        ending_equity: f64,
        equities: &[f64],
        trades: &[ClosedTrade],
    ) -> Self {
        Self {
            ending_equity,
            total_return_pct: total_return_pct(initial_equity, ending_equity),
            total_trades: trades.len(),
            win_rate_pct: win_rate_pct(trades),
            max_drawdown_pct: max_drawdown_pct(equities),
            sharpe_ratio: sharpe_ratio(equities, ANNUALIZATION_PERIODS),
        }
    }

    /// Human-readable key/value rows, in report order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Ending Equity", fmt_money(self.ending_equity)),
            ("Total Return", format!("{:.2}%", self.total_return_pct)),
            ("Total Trades", self.total_trades.to_string()),
            ("Win Rate", format!("{:.2}%", self.win_rate_pct)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown_pct)),
            ("Sharpe Ratio (Annualized)", format!("{:.2}", self.sharpe_ratio)),
        ]
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Backtest Performance Report ---")?;
        for (key, value) in self.rows() {
            writeln!(f, "{key:<25}: {value}")?;
        }
        write!(f, "-----------------------------------")
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a percentage: (final / initial − 1) × 100.
pub fn total_return_pct(initial_equity: f64, ending_equity: f64) -> f64 {
    if initial_equity <= 0.0 {
        return 0.0;
    }
    (ending_equity / initial_equity - 1.0) * 100.0
}

/// Percentage of closed trades with positive PnL. Zero for zero trades.
pub fn win_rate_pct(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.is_winner()).count();
    wins as f64 / trades.len() as f64 * 100.0
}

/// Maximum peak-to-trough decline of the equity curve, as a positive
/// percentage of the running maximum. Zero for flat or sub-2-point curves.
pub fn max_drawdown_pct(equities: &[f64]) -> f64 {
    if equities.len() < 2 {
        return 0.0;
    }
    let mut peak = equities[0];
    let mut max_dd = 0.0f64;
    for &equity in equities {
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd * 100.0
}

/// Annualized Sharpe ratio from step-to-step percentage returns:
/// mean / std × sqrt(periods_per_year).
///
/// Zero when the return series is empty or has zero variance.
pub fn sharpe_ratio(equities: &[f64], periods_per_year: f64) -> f64 {
    let returns = step_returns(equities);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

/// Step-to-step percentage returns of an equity curve.
pub fn step_returns(equities: &[f64]) -> Vec<f64> {
    if equities.len() < 2 {
        return Vec::new();
    }
    equities
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Dollar amount with thousands separators, e.g. `$10,234.56`.
fn fmt_money(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}
