//! Order submission port trait.

use crate::domain::error::AlgotraderError;
use crate::domain::signal::Action;

/// A brokerage that accepts market orders.
///
/// Calls are synchronous and not retried; an error means the order was not
/// placed.
pub trait OrderSink {
    /// Place an order and return the broker's order identifier.
    fn execute(
        &mut self,
        symbol: &str,
        action: Action,
        quantity: u64,
    ) -> Result<String, AlgotraderError>;
}

impl<O: OrderSink + ?Sized> OrderSink for Box<O> {
    fn execute(
        &mut self,
        symbol: &str,
        action: Action,
        quantity: u64,
    ) -> Result<String, AlgotraderError> {
        (**self).execute(symbol, action, quantity)
    }
}
