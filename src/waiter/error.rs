//! Error types for waiters.

use crate::kitchen::KitchenError;
use crate::model::{OrderError, OrderId};
use thiserror::Error;

/// Errors that end a waiter's shift early.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WaiterError {
    /// The kitchen refused or lost the order.
    #[error(transparent)]
    Kitchen(#[from] KitchenError),

    /// The order was moved out of turn.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A completion arrived that this waiter never submitted.
    #[error("{waiter} received {received} while waiting for {expected}")]
    Misrouted {
        waiter: String,
        expected: OrderId,
        received: OrderId,
    },
}
