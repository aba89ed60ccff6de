use crate::framework::{Completion, Gauge, RoutingTable};
use crate::kitchen::KitchenError;
use crate::model::{Order, OrderId};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Client waiters use to hand orders to the kitchen.
///
/// Submitting installs the order's completion route *before* the order becomes visible to
/// the dispatcher, so a cook can never finish an order nobody is waiting for.
#[derive(Clone)]
pub struct KitchenClient {
    sender: mpsc::UnboundedSender<Order>,
    routes: RoutingTable<OrderId, Order>,
    queue_depth: Gauge,
    awaiting_delivery: Gauge,
}

impl KitchenClient {
    pub(crate) fn new(
        sender: mpsc::UnboundedSender<Order>,
        routes: RoutingTable<OrderId, Order>,
        queue_depth: Gauge,
        awaiting_delivery: Gauge,
    ) -> Self {
        Self {
            sender,
            routes,
            queue_depth,
            awaiting_delivery,
        }
    }

    /// Registers the order's route, then puts the order on the kitchen queue.
    ///
    /// The queue is unbounded, so this never waits on kitchen backlog.
    #[instrument(skip_all, fields(order_id = %order.id()))]
    pub fn submit(&self, order: Order) -> Result<OrderTicket, KitchenError> {
        debug!(?order, "submit called");
        let completion = self.routes.register(order.id())?;

        self.queue_depth.increment();
        if self.sender.send(order).is_err() {
            self.queue_depth.decrement();
            self.routes.withdraw(completion.id());
            return Err(KitchenError::Closed);
        }
        info!("Sent to kitchen");
        Ok(OrderTicket { completion })
    }

    /// Orders waiting in the kitchen queue.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth.get()
    }

    /// Orders cooked but not yet delivered.
    pub fn awaiting_delivery(&self) -> usize {
        self.awaiting_delivery.get()
    }

    /// Orders submitted whose completion has not been routed yet.
    pub fn pending_routes(&self) -> usize {
        self.routes.pending()
    }

    /// Records that a ready order has reached its customer.
    pub fn confirm_delivery(&self) {
        self.awaiting_delivery.decrement();
    }

    /// Ends routing for good, releasing every waiter still parked on a route.
    pub(crate) fn close_routes(&self) -> Vec<OrderId> {
        self.routes.close()
    }
}

/// A waiter's claim on one submitted order.
#[derive(Debug)]
pub struct OrderTicket {
    completion: Completion<OrderId, Order>,
}

impl OrderTicket {
    pub fn order_id(&self) -> OrderId {
        *self.completion.id()
    }

    /// Waits until this exact order is ready.
    ///
    /// Fails with [`KitchenError::Interrupted`] if the kitchen abandoned the order.
    pub async fn wait(self) -> Result<Order, KitchenError> {
        let order_id = self.order_id();
        self.completion
            .wait()
            .await
            .map_err(|_| KitchenError::Interrupted(order_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::kitchen;
    use crate::model::Order;
    use std::time::Duration;

    #[tokio::test]
    async fn test_submit_registers_route_then_enqueues() {
        let (_dispatcher, client, _pool) = kitchen::new(1, Duration::from_secs(1));

        let ticket = client.submit(Order::new("Pasta", Duration::from_secs(1))).unwrap();
        assert_eq!(client.queue_depth(), 1);
        assert_eq!(client.pending_routes(), 1);
        assert_eq!(client.close_routes(), vec![ticket.order_id()]);
    }

    #[tokio::test]
    async fn test_submit_after_kitchen_is_gone_withdraws_route() {
        let (dispatcher, client, _pool) = kitchen::new(1, Duration::from_secs(1));
        drop(dispatcher);

        let err = client
            .submit(Order::new("Pasta", Duration::from_secs(1)))
            .unwrap_err();
        assert_eq!(err, crate::kitchen::KitchenError::Closed);
        assert_eq!(client.queue_depth(), 0);
        assert_eq!(client.pending_routes(), 0);
    }
}
