//! Core domain types and logic.

pub mod config;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod order;
pub mod selection;
pub mod session;
pub mod sizing;
pub mod snapshot;
