//! Positions and account capital port trait.
//!
//! The live account is the source of truth for holdings; the engine's own
//! buy-date map is advisory only. One implementation exists per trading
//! platform — any "try this API, fall back to that one" chains belong inside
//! an adapter, not in the engine.

use std::collections::HashMap;

use crate::domain::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountCapital {
    pub available_cash: f64,
    pub total_equity: f64,
}

pub trait PositionSource {
    /// Sellable share count per held symbol. An empty map means no holdings
    /// (or a query that came back empty — indistinguishable by design).
    fn fetch_positions(&self, account: &str) -> HashMap<String, i64>;

    /// Capital figures for sizing. A failure here is recoverable: the caller
    /// falls back to a configured constant.
    fn fetch_capital(&self, account: &str) -> Result<AccountCapital, EngineError>;
}
