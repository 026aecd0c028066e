//! Strategy seam — the narrow contract between the core and the external
//! analysis/strategy pipeline.
//!
//! The runner hands the strategy a historical window ending at the current
//! bar and takes back zero or one signal. Implementations never see the
//! portfolio, and the window never extends past the bar under evaluation.

use crate::domain::{Candle, Signal};

/// A signal source evaluated once per bar.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Evaluate the window ending at the current bar.
    ///
    /// `window` contains every candle up to and including the bar being
    /// processed; the returned signal's timestamp must be the last candle's.
    fn evaluate(&mut self, window: &[Candle], symbol: &str, timeframe: &str) -> Option<Signal>;
}
