//! Kitchen-side logic: the cooking job, the dispatcher and their wiring.

pub mod cooking;
pub mod dispatcher;
pub mod error;

pub use cooking::*;
pub use dispatcher::*;
pub use error::*;

use crate::clients::KitchenClient;
use crate::framework::{Gauge, RoutingTable};
use std::time::Duration;
use tokio::sync::mpsc;

/// Creates a kitchen with `size` cooks.
///
/// Returns the dispatcher (to be run with the pool), the client waiters submit through,
/// and the cooking pool. All three share one routing table.
pub fn new(
    size: usize,
    poll_interval: Duration,
) -> (KitchenDispatcher, KitchenClient, CookingWorkerPool) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let routes = RoutingTable::new();
    let queue_depth = Gauge::new();
    let awaiting_delivery = Gauge::new();

    let pool = CookingWorkerPool::new(
        size,
        KitchenContext {
            routes: routes.clone(),
            awaiting_delivery: awaiting_delivery.clone(),
        },
    );
    let dispatcher =
        KitchenDispatcher::new(receiver, queue_depth.clone(), routes.clone(), poll_interval);
    let client = KitchenClient::new(sender, routes, queue_depth, awaiting_delivery);

    (dispatcher, client, pool)
}
