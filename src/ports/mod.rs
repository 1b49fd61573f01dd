//! Port traits consumed by the engine; concrete implementations live in
//! [`crate::adapters`].

pub mod market_data_port;
pub mod order_port;
pub mod position_source;
