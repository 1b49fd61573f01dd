//! Daily signal snapshot builder.
//!
//! Runs once at the session open: for each instrument in the universe it
//! pulls a bounded lookback of daily bars, computes oscillator values as of
//! the last two completed days, detects the entry crossover, derives the
//! day's stop threshold and freezes the ranking strength. Anything missing —
//! short series, absent open quote, NaN indicator — silently excludes the
//! instrument for the day; the day proceeds with whatever subset is valid.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::config::{EngineConfig, RankingMetric, StopPolicy};
use crate::domain::indicator::{crossed_above, trend_oscillator, volatility_estimate};
use crate::domain::ohlcv::DailyBar;
use crate::ports::market_data_port::MarketDataPort;

/// Immutable per-instrument signal state for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSnapshot {
    /// Today's opening price, from the dedicated near-open query. This is the
    /// baseline for both the pre-trade veto and the intraday drawdown stop.
    pub reference_open: f64,
    /// Oscillator fast line as of T-1 (last completed day).
    pub trend_fast: f64,
    /// Oscillator signal line as of T-1.
    pub trend_signal: f64,
    /// Strict crossover between T-2 and T-1.
    pub is_entry_signal: bool,
    /// Negative fraction: maximum tolerable drawdown from `reference_open`.
    pub stop_fraction: f64,
    /// Ranking score frozen at build time.
    pub strength: f64,
}

/// Build the day's snapshot map. `now` is the initialization instant and is
/// the timestamp used for the reference-open price query.
pub fn build_snapshots(
    config: &EngineConfig,
    today: NaiveDate,
    now: NaiveDateTime,
    data: &dyn MarketDataPort,
) -> HashMap<String, SignalSnapshot> {
    let bars_by_symbol =
        data.fetch_daily_bars(&config.universe, today, config.fetch_lookback());
    // Today's open comes from a near-real-time quote at the open instant, not
    // from the daily series: the daily row for today is not yet reliable.
    let opens = data.fetch_latest_price(&config.universe, now);

    let mut snapshots = HashMap::new();
    for symbol in &config.universe {
        let Some(bars) = bars_by_symbol.get(symbol) else {
            debug!(%symbol, "no daily bars, excluded for the day");
            continue;
        };
        match snapshot_from_series(config, today, bars, opens.get(symbol).copied()) {
            Some(snapshot) => {
                snapshots.insert(symbol.clone(), snapshot);
            }
            None => debug!(%symbol, "insufficient data, excluded for the day"),
        }
    }

    info!(
        valid = snapshots.len(),
        universe = config.universe.len(),
        %today,
        "daily signal snapshots built"
    );
    snapshots
}

/// Compute one instrument's snapshot from its bar series, or `None` if any
/// required field cannot be derived. Bars dated `today` or later are
/// discarded first, so T-1 and T-2 always index completed days.
pub fn snapshot_from_series(
    config: &EngineConfig,
    today: NaiveDate,
    bars: &[DailyBar],
    reference_open: Option<f64>,
) -> Option<SignalSnapshot> {
    let cutoff = bars
        .iter()
        .position(|b| b.date >= today)
        .unwrap_or(bars.len());
    let completed = &bars[..cutoff];

    if completed.len() < config.min_completed_bars() {
        return None;
    }

    let closes: Vec<f64> = completed.iter().map(|b| b.close).collect();
    let osc = trend_oscillator(
        &closes,
        config.fast_period,
        config.slow_period,
        config.signal_period,
    );

    let t1 = closes.len() - 1;
    let t2 = closes.len() - 2;
    if !osc.defined_at(t1) || !osc.defined_at(t2) {
        return None;
    }

    let reference_open = reference_open.filter(|p| p.is_finite() && *p > 0.0)?;

    let stop_fraction = match config.stop_policy {
        StopPolicy::FixedFraction(fraction) => fraction,
        StopPolicy::Volatility { period, multiplier } => {
            let atr = volatility_estimate(completed, period);
            if !atr.is_finite() {
                return None;
            }
            -(atr * multiplier) / reference_open
        }
    };

    let strength = match config.ranking {
        RankingMetric::OscillatorSpread => osc.fast[t1] - osc.signal[t1],
        RankingMetric::Return { lookback } => {
            let base = closes[t1.checked_sub(lookback)?];
            if base <= 0.0 {
                return None;
            }
            closes[t1] / base - 1.0
        }
    };
    if !strength.is_finite() {
        return None;
    }

    Some(SignalSnapshot {
        reference_open,
        trend_fast: osc.fast[t1],
        trend_signal: osc.signal[t1],
        is_entry_signal: crossed_above(osc.fast[t2], osc.signal[t2], osc.fast[t1], osc.signal[t1]),
        stop_fraction,
        strength,
    })
}
