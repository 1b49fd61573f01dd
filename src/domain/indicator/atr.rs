//! Average true range volatility estimate.
//!
//! Mean of per-bar true range over the most recent `period` bars. The first
//! bar of a series has no previous close, so `n` bars support `n - 1` true
//! ranges; callers must pass completed bars only (the still-forming day is
//! excluded upstream).

use crate::domain::ohlcv::DailyBar;

/// NaN when fewer than `period + 1` bars are available.
pub fn volatility_estimate(bars: &[DailyBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return f64::NAN;
    }

    let start = bars.len() - period;
    let mut sum = 0.0;
    for i in start..bars.len() {
        sum += bars[i].true_range(bars[i - 1].close);
    }
    sum / period as f64
}
