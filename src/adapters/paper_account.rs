//! In-memory paper account for replays and integration tests.
//!
//! Implements both the positions/account query port and the order port:
//! accepted buys move cash into holdings, accepted sells liquidate them.
//! Holdings are valued at the last price they traded at, which is enough
//! for the equity figure a replay needs.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::domain::error::EngineError;
use crate::domain::order::{Order, Side};
use crate::ports::order_port::OrderPort;
use crate::ports::position_source::{AccountCapital, PositionSource};

struct PaperState {
    cash: f64,
    positions: HashMap<String, i64>,
    last_price: HashMap<String, f64>,
}

pub struct PaperAccount {
    state: RefCell<PaperState>,
}

impl PaperAccount {
    pub fn new(cash: f64) -> Self {
        PaperAccount {
            state: RefCell::new(PaperState {
                cash,
                positions: HashMap::new(),
                last_price: HashMap::new(),
            }),
        }
    }

    /// Seed a holding, e.g. to replay a day that starts with open positions.
    pub fn deposit_position(&self, symbol: &str, shares: i64, price: f64) {
        let mut state = self.state.borrow_mut();
        *state.positions.entry(symbol.to_string()).or_insert(0) += shares;
        state.last_price.insert(symbol.to_string(), price);
    }

    pub fn cash(&self) -> f64 {
        self.state.borrow().cash
    }

    pub fn position(&self, symbol: &str) -> i64 {
        self.state
            .borrow()
            .positions
            .get(symbol)
            .copied()
            .unwrap_or(0)
    }
}

impl PositionSource for PaperAccount {
    fn fetch_positions(&self, _account: &str) -> HashMap<String, i64> {
        self.state
            .borrow()
            .positions
            .iter()
            .filter(|&(_, &shares)| shares > 0)
            .map(|(symbol, &shares)| (symbol.clone(), shares))
            .collect()
    }

    fn fetch_capital(&self, _account: &str) -> Result<AccountCapital, EngineError> {
        let state = self.state.borrow();
        let holdings: f64 = state
            .positions
            .iter()
            .map(|(symbol, &shares)| {
                shares as f64 * state.last_price.get(symbol).copied().unwrap_or(0.0)
            })
            .sum();
        Ok(AccountCapital {
            available_cash: state.cash,
            total_equity: state.cash + holdings,
        })
    }
}

impl OrderPort for PaperAccount {
    fn submit_order(&self, _account: &str, order: &Order) -> Result<(), EngineError> {
        let mut state = self.state.borrow_mut();
        let value = order.shares as f64 * order.price;

        if order.shares <= 0 {
            return Err(EngineError::OrderRejected {
                symbol: order.symbol.clone(),
                reason: format!("non-positive share count {}", order.shares),
            });
        }

        match order.side {
            Side::Buy => {
                if value > state.cash {
                    return Err(EngineError::OrderRejected {
                        symbol: order.symbol.clone(),
                        reason: format!("insufficient cash: need {value:.2}, have {:.2}", state.cash),
                    });
                }
                state.cash -= value;
                *state.positions.entry(order.symbol.clone()).or_insert(0) += order.shares;
            }
            Side::Sell => {
                let held = state.positions.get(&order.symbol).copied().unwrap_or(0);
                if order.shares > held {
                    return Err(EngineError::OrderRejected {
                        symbol: order.symbol.clone(),
                        reason: format!("insufficient sellable volume: {held} held"),
                    });
                }
                state.cash += value;
                let remaining = held - order.shares;
                if remaining == 0 {
                    state.positions.remove(&order.symbol);
                } else {
                    state.positions.insert(order.symbol.clone(), remaining);
                }
            }
        }

        state.last_price.insert(order.symbol.clone(), order.price);
        Ok(())
    }
}
