//! EMA-difference trend oscillator (generalized MACD).
//!
//! fast line = EMA(close, fast) - EMA(close, slow)
//! signal line = EMA(fast line, signal)
//! histogram = 2 * (fast line - signal line)
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! All three outputs are all-NaN when the close series is shorter than the
//! slow period.

use crate::domain::indicator::ema::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// Three equal-length series aligned with the input closes.
#[derive(Debug, Clone)]
pub struct TrendOscillator {
    pub fast: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl TrendOscillator {
    pub fn len(&self) -> usize {
        self.fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fast.is_empty()
    }

    /// True when all three outputs carry a number at `index`.
    pub fn defined_at(&self, index: usize) -> bool {
        index < self.len()
            && self.fast[index].is_finite()
            && self.signal[index].is_finite()
            && self.histogram[index].is_finite()
    }
}

pub fn trend_oscillator(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> TrendOscillator {
    if fast_period == 0
        || slow_period == 0
        || signal_period == 0
        || closes.len() < slow_period
    {
        let nan = vec![f64::NAN; closes.len()];
        return TrendOscillator {
            fast: nan.clone(),
            signal: nan.clone(),
            histogram: nan,
        };
    }

    let ema_fast = ema(closes, fast_period);
    let ema_slow = ema(closes, slow_period);

    let fast: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema(&fast, signal_period);

    let histogram: Vec<f64> = fast
        .iter()
        .zip(&signal)
        .map(|(f, s)| 2.0 * (f - s))
        .collect();

    TrendOscillator {
        fast,
        signal,
        histogram,
    }
}

/// Strict directional crossover between two consecutive completed days:
/// at-or-below at T-2, strictly above at T-1.
pub fn crossed_above(fast_t2: f64, signal_t2: f64, fast_t1: f64, signal_t1: f64) -> bool {
    fast_t2 <= signal_t2 && fast_t1 > signal_t1
}
