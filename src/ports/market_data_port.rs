//! Market data access port trait.
//!
//! Missing or insufficient data is represented by an absent key or a short
//! series, never an error: the engine's failure policy for per-instrument
//! data problems is skip-and-continue.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use crate::domain::ohlcv::DailyBar;

pub trait MarketDataPort {
    /// Up to `lookback` daily bars per symbol, time-ascending, ending at
    /// `as_of` (the bar dated `as_of` may still be forming).
    fn fetch_daily_bars(
        &self,
        symbols: &[String],
        as_of: NaiveDate,
        lookback: usize,
    ) -> HashMap<String, Vec<DailyBar>>;

    /// Latest traded price per symbol at or immediately before `at`, within
    /// the same trading day.
    fn fetch_latest_price(
        &self,
        symbols: &[String],
        at: NaiveDateTime,
    ) -> HashMap<String, f64>;
}
