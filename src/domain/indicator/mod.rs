//! Technical indicator implementations.
//!
//! Pure functions over ordered daily series. Insufficient data propagates as
//! NaN rather than an error; downstream consumers check-and-skip.

pub mod atr;
pub mod ema;
pub mod oscillator;

pub use atr::volatility_estimate;
pub use ema::ema;
pub use oscillator::{crossed_above, trend_oscillator, TrendOscillator};
