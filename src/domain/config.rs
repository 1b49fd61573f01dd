//! Engine configuration and validation.
//!
//! One parameterized engine replaces the original family of near-identical
//! strategy variants: the stop policy and the ranking metric are selected
//! here at initialization, not by parallel code copies.

use chrono::NaiveTime;
use std::collections::HashSet;

use crate::domain::error::EngineError;

/// Extra bars requested beyond the minimal sufficient lookback, so indicator
/// values at T-1 are well converged.
pub const LOOKBACK_MARGIN: usize = 20;

/// Minimum tradable share increment in this domain.
pub const DEFAULT_LOT_SIZE: i64 = 100;

/// How the per-day stop threshold below `reference_open` is derived.
/// Exactly one policy is active per configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopPolicy {
    /// Fixed negative fraction, e.g. -0.02 for a 2% intraday drawdown limit.
    FixedFraction(f64),
    /// -(ATR(period) * multiplier) / reference_open, recomputed per day.
    Volatility { period: usize, multiplier: f64 },
}

/// Strength score used to rank entry candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMetric {
    /// Oscillator fast-minus-signal spread as of T-1.
    OscillatorSpread,
    /// close[T-1] / close[T-1-lookback] - 1.
    Return { lookback: usize },
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub account: String,
    pub universe: Vec<String>,
    pub max_positions: usize,
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub stop_policy: StopPolicy,
    pub ranking: RankingMetric,
    pub lot_size: i64,
    /// Capital base used when the account capital query fails outright.
    pub fallback_capital: f64,
    /// Session open: snapshots are built at this instant.
    pub open_time: NaiveTime,
    /// The single fixed intraday evaluation time for entries.
    pub entry_time: NaiveTime,
    /// Late-session checkpoint for the trend-reversal exit.
    pub reversal_time: NaiveTime,
    pub monitor_start: NaiveTime,
    pub monitor_end: NaiveTime,
}

impl EngineConfig {
    /// Completed prior bars an instrument must supply to get a snapshot.
    pub fn min_completed_bars(&self) -> usize {
        let mut min = self.slow_period + self.signal_period + 2;
        if let StopPolicy::Volatility { period, .. } = self.stop_policy {
            min = min.max(period + 1);
        }
        if let RankingMetric::Return { lookback } = self.ranking {
            min = min.max(lookback + 1);
        }
        min
    }

    /// Bars requested from the data port per instrument. One extra on top of
    /// the margin because the fetched series may still contain the forming
    /// bar for the current day.
    pub fn fetch_lookback(&self) -> usize {
        self.min_completed_bars() + LOOKBACK_MARGIN + 1
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        fn invalid(section: &str, key: &str, reason: &str) -> EngineError {
            EngineError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: reason.into(),
            }
        }

        if self.account.is_empty() {
            return Err(invalid("engine", "account", "must not be empty"));
        }
        if self.universe.is_empty() {
            return Err(invalid("engine", "universe", "must not be empty"));
        }
        if self.max_positions == 0 {
            return Err(invalid("engine", "max_positions", "must be at least 1"));
        }
        if self.lot_size <= 0 {
            return Err(invalid("engine", "lot_size", "must be positive"));
        }
        if !(self.fallback_capital.is_finite() && self.fallback_capital > 0.0) {
            return Err(invalid("engine", "fallback_capital", "must be positive"));
        }

        if self.fast_period == 0 || self.slow_period == 0 || self.signal_period == 0 {
            return Err(invalid("oscillator", "periods", "must all be positive"));
        }
        if self.fast_period >= self.slow_period {
            return Err(invalid(
                "oscillator",
                "fast",
                "fast period must be shorter than slow period",
            ));
        }

        match self.stop_policy {
            StopPolicy::FixedFraction(f) => {
                if !(f.is_finite() && f < 0.0) {
                    return Err(invalid(
                        "stop",
                        "fraction",
                        "must be a negative fraction, e.g. -0.02",
                    ));
                }
            }
            StopPolicy::Volatility { period, multiplier } => {
                if period == 0 {
                    return Err(invalid("stop", "period", "must be at least 1"));
                }
                if !(multiplier.is_finite() && multiplier > 0.0) {
                    return Err(invalid("stop", "multiplier", "must be positive"));
                }
            }
        }

        if let RankingMetric::Return { lookback } = self.ranking {
            if lookback == 0 {
                return Err(invalid("engine", "return_lookback", "must be at least 1"));
            }
        }

        if self.open_time >= self.entry_time {
            return Err(invalid(
                "schedule",
                "entry",
                "entry instant must come after the session open",
            ));
        }
        if self.entry_time >= self.reversal_time {
            return Err(invalid(
                "schedule",
                "reversal",
                "reversal checkpoint must come after the entry instant",
            ));
        }
        if self.monitor_start <= self.open_time {
            return Err(invalid(
                "schedule",
                "monitor_start",
                "monitoring must start after the session open",
            ));
        }
        if self.monitor_end < self.reversal_time {
            return Err(invalid(
                "schedule",
                "monitor_end",
                "monitoring window must cover the reversal checkpoint",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse a comma-separated symbol list; order is preserved because it is the
/// deterministic scan order for ranking ties.
pub fn parse_universe(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
