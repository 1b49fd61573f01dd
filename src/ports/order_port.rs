//! Order submission port trait.

use crate::domain::error::EngineError;
use crate::domain::order::Order;

pub trait OrderPort {
    /// Fire-and-forget limit-style submission. A rejection is logged by the
    /// caller and never retried; it does not block remaining instruments.
    fn submit_order(&self, account: &str, order: &Order) -> Result<(), EngineError>;
}
