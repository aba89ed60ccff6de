//! The cooking job run by the kitchen's worker pool.

use crate::framework::{Gauge, Job, RoutingTable, WorkerPool};
use crate::kitchen::KitchenError;
use crate::model::{Order, OrderId, OrderStatus};
use async_trait::async_trait;
use tracing::info;

/// Bounded pool of cooks.
pub type CookingWorkerPool = WorkerPool<CookingTask>;

/// Dependencies every cook needs once a dish is done.
pub struct KitchenContext {
    /// Where finished orders are handed back to their waiters.
    pub routes: RoutingTable<OrderId, Order>,
    /// Orders that are ready but not delivered yet.
    pub awaiting_delivery: Gauge,
}

/// Prepares a single order.
///
/// Cooking takes the order's preparation time. If the pool cancels the task during that
/// wait, the order never becomes Ready and nobody is notified.
#[derive(Debug)]
pub struct CookingTask {
    order: Order,
}

impl CookingTask {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[async_trait]
impl Job for CookingTask {
    type Id = OrderId;
    type Context = KitchenContext;
    type Error = KitchenError;

    fn id(&self) -> OrderId {
        self.order.id()
    }

    async fn run(self, ctx: &KitchenContext) -> Result<(), KitchenError> {
        let mut order = self.order;
        let order_id = order.id();

        order.advance(OrderStatus::Cooking)?;
        info!(%order_id, dish = order.dish_name(), "Started cooking");

        tokio::time::sleep(order.preparation_time()).await;

        order.advance(OrderStatus::Ready)?;
        info!(%order_id, dish = order.dish_name(), "Finished cooking");

        ctx.awaiting_delivery.increment();
        if let Err(e) = ctx.routes.complete(&order_id, order) {
            ctx.awaiting_delivery.decrement();
            return Err(e.into());
        }
        Ok(())
    }
}
