//! Shared fixtures for the session integration tests: canned bar series,
//! a scripted market data feed and an order port that rejects on demand.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::cell::RefCell;
use std::collections::HashMap;

use mintrend::domain::config::{EngineConfig, RankingMetric, StopPolicy, DEFAULT_LOT_SIZE};
use mintrend::domain::error::EngineError;
use mintrend::domain::indicator::{crossed_above, trend_oscillator};
use mintrend::domain::ohlcv::DailyBar;
use mintrend::domain::order::Order;
use mintrend::ports::market_data_port::MarketDataPort;
use mintrend::ports::order_port::OrderPort;

pub fn trade_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    trade_date().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

pub fn engine_config(universe: &[&str], max_positions: usize) -> EngineConfig {
    EngineConfig {
        account: "40098981".into(),
        universe: universe.iter().map(|s| s.to_string()).collect(),
        max_positions,
        fast_period: 12,
        slow_period: 26,
        signal_period: 9,
        stop_policy: StopPolicy::FixedFraction(-0.02),
        ranking: RankingMetric::OscillatorSpread,
        lot_size: DEFAULT_LOT_SIZE,
        fallback_capital: 1_000_000.0,
        open_time: NaiveTime::from_hms_opt(9, 31, 0).unwrap(),
        entry_time: NaiveTime::from_hms_opt(14, 46, 0).unwrap(),
        reversal_time: NaiveTime::from_hms_opt(14, 55, 0).unwrap(),
        monitor_start: NaiveTime::from_hms_opt(9, 32, 0).unwrap(),
        monitor_end: NaiveTime::from_hms_opt(14, 59, 0).unwrap(),
    }
}

/// Bars on consecutive calendar days, the last one dated the day before the
/// trade date, so every bar counts as completed.
pub fn make_bars(symbol: &str, closes: &[f64]) -> Vec<DailyBar> {
    let n = closes.len() as u64;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| DailyBar {
            symbol: symbol.to_string(),
            date: trade_date()
                .checked_sub_days(Days::new(n - i as u64))
                .unwrap(),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000,
        })
        .collect()
}

/// Flat closes, then a rally; truncated so the fast/signal crossover lands
/// exactly on the last completed day.
pub fn fresh_cross_closes(config: &EngineConfig, step: f64) -> Vec<f64> {
    let mut closes = vec![100.0; 60];
    closes.extend((1..=15).map(|i| 100.0 + i as f64 * step));

    let osc = trend_oscillator(
        &closes,
        config.fast_period,
        config.slow_period,
        config.signal_period,
    );
    let cross = (1..closes.len())
        .find(|&i| crossed_above(osc.fast[i - 1], osc.signal[i - 1], osc.fast[i], osc.signal[i]))
        .expect("series contains a crossover");

    closes.truncate(cross + 1);
    closes
}

/// Flat closes: the oscillator sits at zero, no entry signal and no reversal.
pub fn flat_closes() -> Vec<f64> {
    vec![100.0; 75]
}

/// Flat then declining closes: fast ends strictly below signal.
pub fn decline_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 60];
    closes.extend((1..=15).map(|i| 100.0 - i as f64 * 2.0));
    closes
}

/// Canned market data: fixed daily series per symbol plus a mutable price
/// board the test adjusts between ticks. Serves each stored series whole;
/// lookback trimming is an adapter concern and is tested there.
pub struct ScriptedMarket {
    daily: HashMap<String, Vec<DailyBar>>,
    prices: RefCell<HashMap<String, f64>>,
}

impl ScriptedMarket {
    pub fn new() -> Self {
        ScriptedMarket {
            daily: HashMap::new(),
            prices: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_series(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.daily.insert(symbol.to_string(), make_bars(symbol, closes));
        self
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices.borrow_mut().insert(symbol.to_string(), price);
    }
}

impl MarketDataPort for ScriptedMarket {
    fn fetch_daily_bars(
        &self,
        symbols: &[String],
        _as_of: NaiveDate,
        _lookback: usize,
    ) -> HashMap<String, Vec<DailyBar>> {
        symbols
            .iter()
            .filter_map(|s| self.daily.get(s).map(|bars| (s.clone(), bars.clone())))
            .collect()
    }

    fn fetch_latest_price(
        &self,
        symbols: &[String],
        _at: NaiveDateTime,
    ) -> HashMap<String, f64> {
        let prices = self.prices.borrow();
        symbols
            .iter()
            .filter_map(|s| prices.get(s).map(|&p| (s.clone(), p)))
            .collect()
    }
}

/// Order port that rejects one configured symbol and records the rest.
pub struct RejectingOrders {
    reject_symbol: String,
    pub accepted: RefCell<Vec<Order>>,
}

impl RejectingOrders {
    pub fn rejecting(symbol: &str) -> Self {
        RejectingOrders {
            reject_symbol: symbol.to_string(),
            accepted: RefCell::new(Vec::new()),
        }
    }
}

impl OrderPort for RejectingOrders {
    fn submit_order(&self, _account: &str, order: &Order) -> Result<(), EngineError> {
        if order.symbol == self.reject_symbol {
            return Err(EngineError::OrderRejected {
                symbol: order.symbol.clone(),
                reason: "scripted rejection".into(),
            });
        }
        self.accepted.borrow_mut().push(order.clone());
        Ok(())
    }
}
