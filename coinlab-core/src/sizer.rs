//! Position sizing — the fixed-fractional risk model.
//!
//! Risk a constant percentage of current equity per trade, scaled by the
//! distance between entry and stop: losing the full entry→stop distance on
//! the computed quantity costs exactly `equity * risk_pct / 100`.

use tracing::warn;

/// Stops tighter than this are degenerate and cannot be sized.
const MIN_RISK_PER_UNIT: f64 = 1e-9;

/// Quantity to trade for the given equity, risk percentage, and stop distance.
///
/// Pure and deterministic. Returns `None` for non-finite entry/stop (a signal
/// whose entry or stop is absent deserializes to NaN) and for degenerate stop
/// distances — never panics.
pub fn fixed_fractional(
    equity: f64,
    risk_pct: f64,
    entry_price: f64,
    stop_price: f64,
) -> Option<f64> {
    if !entry_price.is_finite() || !stop_price.is_finite() {
        warn!("cannot size a position with missing entry or stop-loss");
        return None;
    }

    let risk_per_unit = (entry_price - stop_price).abs();
    if risk_per_unit <= MIN_RISK_PER_UNIT {
        warn!(
            entry_price,
            stop_price, "risk per unit is zero or negligible; cannot size position"
        );
        return None;
    }

    let risk_amount = equity * (risk_pct / 100.0);
    Some(risk_amount / risk_per_unit)
}
