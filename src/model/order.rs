//! The [`Order`] entity and its status lifecycle.

use crate::model::ids::ORDER_IDS;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Where an order is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Cooking,
    Ready,
    Delivered,
}

impl OrderStatus {
    /// The only status this one may advance to.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Created => Some(OrderStatus::Cooking),
            OrderStatus::Cooking => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }
}

/// Errors raised when an order is mutated out of turn.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("{id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("{id} already belongs to {waiter}")]
    WaiterAlreadyAssigned { id: OrderId, waiter: String },
}

/// Represents one customer order moving through the restaurant.
///
/// An `Order` is a moved value: it belongs to its waiter until submission, to the kitchen
/// until it is ready, and to its waiter again for delivery. Only the current owner can
/// touch it, so no locking is involved.
///
/// Status only ever advances one step at a time along
/// `Created -> Cooking -> Ready -> Delivered`; see [`Order::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    dish_name: String,
    preparation_time: Duration,
    status: OrderStatus,
    waiter_name: Option<String>,
}

impl Order {
    /// Creates a new order with the next process-wide id.
    ///
    /// # Arguments
    /// * `dish_name` - What the customer asked for
    /// * `preparation_time` - How long the kitchen needs to cook it
    pub fn new(dish_name: impl Into<String>, preparation_time: Duration) -> Self {
        Self::with_id(ORDER_IDS.next_id(), dish_name, preparation_time)
    }

    /// Creates an order with an explicit id (for ids drawn from a private generator).
    pub fn with_id(id: OrderId, dish_name: impl Into<String>, preparation_time: Duration) -> Self {
        Self {
            id,
            dish_name: dish_name.into(),
            preparation_time,
            status: OrderStatus::Created,
            waiter_name: None,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn dish_name(&self) -> &str {
        &self.dish_name
    }

    pub fn preparation_time(&self) -> Duration {
        self.preparation_time
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn waiter_name(&self) -> Option<&str> {
        self.waiter_name.as_deref()
    }

    /// Records which waiter took the order. Allowed exactly once.
    pub fn assign_waiter(&mut self, waiter: impl Into<String>) -> Result<(), OrderError> {
        if let Some(current) = &self.waiter_name {
            return Err(OrderError::WaiterAlreadyAssigned {
                id: self.id,
                waiter: current.clone(),
            });
        }
        self.waiter_name = Some(waiter.into());
        Ok(())
    }

    /// Moves the order to `to`, which must be the direct successor of its status.
    pub fn advance(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.next() != Some(to) {
            return Err(OrderError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order #{} [{}], prep time: {}s",
            self.id.0,
            self.dish_name,
            self.preparation_time.as_secs()
        )
    }
}
