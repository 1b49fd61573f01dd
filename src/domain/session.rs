//! Day-scoped session engine.
//!
//! Purely reactive to a monotonic sequence of intraday timestamps, split into
//! three disjoint windows: the initialization instant (snapshots are built),
//! the entry instant (candidates are selected, sized and bought, once per
//! day), and the monitoring window (held instruments are checked for exits on
//! every tick). Ticks outside regular trading hours are no-ops.
//!
//! The per-day state is owned by the [`Engine`] value, so several sessions or
//! replays can run side by side without shared state.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::domain::config::EngineConfig;
use crate::domain::order::{Order, Side};
use crate::domain::selection::{qualified_candidates, rank_and_truncate};
use crate::domain::sizing::plan_entries;
use crate::domain::snapshot::{build_snapshots, SignalSnapshot};
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::order_port::OrderPort;
use crate::ports::position_source::PositionSource;

/// Snapshot map for one trading day, tagged with its date so a stale map is
/// never consulted after a day rollover.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub trade_date: NaiveDate,
    pub snapshots: HashMap<String, SignalSnapshot>,
}

/// Why a held instrument was liquidated. Triggers are evaluated in this
/// order; the first match wins and at most one sell goes out per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    DrawdownStop,
    TrendReversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::DrawdownStop => write!(f, "drawdown stop"),
            ExitReason::TrendReversal => write!(f, "trend reversal"),
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    state: Option<SessionState>,
    /// Date first bought per symbol. Advisory bookkeeping only — entitlement
    /// to sell is always re-derived from the live positions query.
    buy_dates: HashMap<String, NaiveDate>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, crate::domain::error::EngineError> {
        config.validate()?;
        Ok(Engine {
            config,
            state: None,
            buy_dates: HashMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session_date(&self) -> Option<NaiveDate> {
        self.state.as_ref().map(|s| s.trade_date)
    }

    pub fn buy_date(&self, symbol: &str) -> Option<NaiveDate> {
        self.buy_dates.get(symbol).copied()
    }

    /// Process one tick. Returns the orders that were accepted by the order
    /// port this tick; rejected submissions are logged and skipped.
    pub fn on_tick(
        &mut self,
        now: NaiveDateTime,
        data: &dyn MarketDataPort,
        positions: &dyn PositionSource,
        orders: &dyn OrderPort,
    ) -> Vec<Order> {
        let time = now.time();

        if time == self.config.open_time {
            self.open_session(now);
            let state = SessionState {
                trade_date: now.date(),
                snapshots: build_snapshots(&self.config, now.date(), now, data),
            };
            self.state = Some(state);
            return Vec::new();
        }

        if time == self.config.entry_time {
            return self.run_entry(now, data, positions, orders);
        }

        if time < self.config.monitor_start || time > self.config.monitor_end {
            return Vec::new();
        }

        self.run_monitor(now, data, positions, orders)
    }

    fn open_session(&mut self, now: NaiveDateTime) {
        if let Some(previous) = &self.state {
            debug!(stale = %previous.trade_date, today = %now.date(), "replacing session state");
        }
    }

    /// The day's stale-state guard: entry and monitoring only act on
    /// snapshots built this very day.
    fn current_state(&self, today: NaiveDate) -> Option<&SessionState> {
        match &self.state {
            Some(state) if state.trade_date == today => Some(state),
            Some(state) => {
                debug!(
                    stale = %state.trade_date,
                    %today,
                    "session state is stale, skipping"
                );
                None
            }
            None => None,
        }
    }

    fn run_entry(
        &mut self,
        now: NaiveDateTime,
        data: &dyn MarketDataPort,
        positions: &dyn PositionSource,
        orders: &dyn OrderPort,
    ) -> Vec<Order> {
        let today = now.date();
        let Some(state) = self.current_state(today) else {
            return Vec::new();
        };
        if state.snapshots.is_empty() {
            info!("no instrument holds a snapshot today, entry checkpoint short-circuits");
            return Vec::new();
        }

        let with_snapshot: Vec<String> = self
            .config
            .universe
            .iter()
            .filter(|s| state.snapshots.contains_key(*s))
            .cloned()
            .collect();
        let prices = data.fetch_latest_price(&with_snapshot, now);

        let held = positions.fetch_positions(&self.config.account);
        if held.len() >= self.config.max_positions {
            info!(
                held = held.len(),
                max = self.config.max_positions,
                "already at capacity, no entries today"
            );
            return Vec::new();
        }
        let free_slots = self.config.max_positions - held.len();

        let candidates = rank_and_truncate(
            qualified_candidates(&self.config.universe, &state.snapshots, &prices),
            free_slots,
        );
        if candidates.is_empty() {
            info!("no qualified entry candidates today");
            return Vec::new();
        }

        let capital_base = self.capital_base(positions);
        let planned = plan_entries(
            &candidates,
            &held,
            capital_base,
            self.config.max_positions,
            self.config.lot_size,
        );

        let mut dispatched = Vec::new();
        for order in planned {
            if self.dispatch(orders, &order) {
                self.buy_dates.insert(order.symbol.clone(), today);
                dispatched.push(order);
            }
        }

        info!(
            buys = dispatched.len(),
            candidates = candidates.len(),
            "entry checkpoint complete"
        );
        dispatched
    }

    fn run_monitor(
        &mut self,
        now: NaiveDateTime,
        data: &dyn MarketDataPort,
        positions: &dyn PositionSource,
        orders: &dyn OrderPort,
    ) -> Vec<Order> {
        let held = positions.fetch_positions(&self.config.account);
        if held.is_empty() {
            return Vec::new();
        }
        let Some(state) = self.current_state(now.date()) else {
            return Vec::new();
        };

        // Sorted pass order keeps logs and dispatch order deterministic.
        let mut symbols: Vec<String> = held.keys().cloned().collect();
        symbols.sort();
        let prices = data.fetch_latest_price(&symbols, now);

        let at_reversal_checkpoint = now.time() == self.config.reversal_time;
        let mut exits = Vec::new();

        for symbol in &symbols {
            let volume = held[symbol];
            if volume <= 0 {
                continue;
            }
            let Some(snapshot) = state.snapshots.get(symbol) else {
                continue;
            };
            let Some(&price) = prices.get(symbol) else {
                continue;
            };
            if !price.is_finite() || price <= 0.0 {
                continue;
            }

            let drawdown = price / snapshot.reference_open - 1.0;
            let reason = if drawdown < snapshot.stop_fraction {
                Some(ExitReason::DrawdownStop)
            } else if at_reversal_checkpoint && snapshot.trend_fast < snapshot.trend_signal {
                Some(ExitReason::TrendReversal)
            } else {
                None
            };

            if let Some(reason) = reason {
                info!(%symbol, %reason, price, drawdown, "exit condition met");
                exits.push((symbol.clone(), volume, price));
            }
        }

        let mut dispatched = Vec::new();
        for (symbol, volume, price) in exits {
            let order = Order {
                side: Side::Sell,
                symbol: symbol.clone(),
                shares: volume,
                price,
            };
            if self.dispatch(orders, &order) {
                self.buy_dates.remove(&symbol);
                dispatched.push(order);
            }
        }
        dispatched
    }

    /// Available cash preferred, total equity as fallback, configured
    /// constant when the query fails outright.
    fn capital_base(&self, positions: &dyn PositionSource) -> f64 {
        match positions.fetch_capital(&self.config.account) {
            Ok(capital) => {
                if capital.available_cash.is_finite() && capital.available_cash > 0.0 {
                    capital.available_cash
                } else if capital.total_equity.is_finite() && capital.total_equity > 0.0 {
                    capital.total_equity
                } else {
                    warn!(
                        fallback = self.config.fallback_capital,
                        "capital query returned no usable figure, using fallback"
                    );
                    self.config.fallback_capital
                }
            }
            Err(err) => {
                warn!(
                    %err,
                    fallback = self.config.fallback_capital,
                    "capital query failed, using fallback"
                );
                self.config.fallback_capital
            }
        }
    }

    fn dispatch(&self, port: &dyn OrderPort, order: &Order) -> bool {
        match port.submit_order(&self.config.account, order) {
            Ok(()) => {
                info!(
                    side = %order.side,
                    symbol = %order.symbol,
                    shares = order.shares,
                    price = order.price,
                    "order submitted"
                );
                true
            }
            Err(err) => {
                warn!(
                    side = %order.side,
                    symbol = %order.symbol,
                    shares = order.shares,
                    price = order.price,
                    %err,
                    "order submission failed, continuing with remaining instruments"
                );
                false
            }
        }
    }
}
