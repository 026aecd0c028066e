//! EquityCurve — append-only, time-indexed account value history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of total account value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Ordered, append-only equity history with one point per processed bar.
///
/// Repeated observations for the same timestamp are ignored, so marking the
/// same bar to market twice never duplicates a point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record total equity for a bar, deduplicated by timestamp.
    pub fn observe(&mut self, timestamp: DateTime<Utc>, equity: f64) {
        if self.points.last().is_some_and(|p| p.timestamp == timestamp) {
            return;
        }
        self.points.push(EquityPoint { timestamp, equity });
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn last_equity(&self) -> Option<f64> {
        self.points.last().map(|p| p.equity)
    }

    /// Equity values in time order, for metric computation.
    pub fn equities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
