//! Order value types shared by sizing, dispatch and the order port.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A limit-style order at the price the instrument was evaluated at.
/// Fire-and-forget: no order id or fill confirmation comes back.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub side: Side,
    pub symbol: String,
    pub shares: i64,
    pub price: f64,
}
