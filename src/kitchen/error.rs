//! Error types for the kitchen.

use crate::framework::FrameworkError;
use crate::model::{OrderError, OrderId};
use thiserror::Error;

/// Errors that can occur while submitting, dispatching or cooking orders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum KitchenError {
    /// The kitchen queue is gone; nothing more can be submitted.
    #[error("Kitchen is closed")]
    Closed,

    /// The order was dropped by the kitchen during shutdown and will never be ready.
    #[error("{0} was abandoned by the kitchen")]
    Interrupted(OrderId),

    /// Pool or routing failure.
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    /// The order was moved out of turn.
    #[error(transparent)]
    Order(#[from] OrderError),
}
