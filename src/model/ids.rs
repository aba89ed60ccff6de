//! Process-wide order numbering.

use crate::model::OrderId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing [`OrderId`]s starting at 1.
///
/// Safe to share between any number of tasks; no id is ever issued twice by the same
/// generator.
#[derive(Debug)]
pub struct OrderIdGenerator {
    next: AtomicU64,
}

impl OrderIdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> OrderId {
        OrderId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// The generator every [`Order`](crate::model::Order) draws from.
pub static ORDER_IDS: OrderIdGenerator = OrderIdGenerator::new();
