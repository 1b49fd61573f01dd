//! Concrete implementations of the port traits.

pub mod csv_market_data;
pub mod ini_config;
pub mod paper_account;
