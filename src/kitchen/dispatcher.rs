//! # Kitchen Dispatcher
//!
//! Moves orders from the kitchen queue into the cooking pool.
//!
//! The dispatcher only hands orders over; it never waits for one to be cooked, so the
//! pool alone decides how many dishes are on the stove. The queue is polled with a
//! bounded timeout so a stop request is noticed even when no orders arrive.
//!
//! ## Stopping
//!
//! A stop request does not drop anything: whatever is already queued is dispatched first,
//! then the loop exits. The loop also ends when every [`KitchenClient`] is gone and the
//! queue is empty.
//!
//! [`KitchenClient`]: crate::clients::KitchenClient

use crate::framework::{Gauge, RoutingTable, StopToken};
use crate::kitchen::{CookingTask, CookingWorkerPool};
use crate::model::{Order, OrderId};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Totals reported by a dispatcher once its loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Orders handed to the cooking pool.
    pub dispatched: usize,
    /// Orders the pool refused; their waiters are released with an interrupted wait.
    pub rejected: usize,
}

/// Drains the kitchen queue into a [`CookingWorkerPool`].
pub struct KitchenDispatcher {
    receiver: mpsc::UnboundedReceiver<Order>,
    queue_depth: Gauge,
    routes: RoutingTable<OrderId, Order>,
    poll_interval: Duration,
}

impl KitchenDispatcher {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<Order>,
        queue_depth: Gauge,
        routes: RoutingTable<OrderId, Order>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            receiver,
            queue_depth,
            routes,
            poll_interval,
        }
    }

    /// Runs the dispatch loop until `stop` fires and the queue is empty.
    ///
    /// The pool is injected here rather than at construction, so the dispatcher and the
    /// clients can be created before the kitchen is staffed.
    pub async fn run(mut self, pool: CookingWorkerPool, stop: StopToken) -> DispatchReport {
        info!(poll_interval = ?self.poll_interval, "Dispatcher started");
        let mut report = DispatchReport::default();

        loop {
            if stop.is_stopped() {
                // Drain what is already queued before leaving.
                while let Ok(order) = self.receiver.try_recv() {
                    self.dispatch(&pool, order, &mut report);
                }
                break;
            }

            match tokio::time::timeout(self.poll_interval, self.receiver.recv()).await {
                Ok(Some(order)) => self.dispatch(&pool, order, &mut report),
                Ok(None) => {
                    info!("Kitchen queue closed");
                    break;
                }
                Err(_) => {} // Poll timed out; re-check the stop token
            }
        }

        info!(
            dispatched = report.dispatched,
            rejected = report.rejected,
            "Dispatcher stopped"
        );
        report
    }

    fn dispatch(&self, pool: &CookingWorkerPool, order: Order, report: &mut DispatchReport) {
        self.queue_depth.decrement();
        let order_id = order.id();
        debug!(%order_id, dish = order.dish_name(), "Dispatching");

        match pool.submit(CookingTask::new(order)) {
            Ok(()) => report.dispatched += 1,
            Err(e) => {
                report.rejected += 1;
                // Release the waiter instead of leaving it parked on a dead route.
                self.routes.withdraw(&order_id);
                error!(%order_id, error = %e, "Cooking pool rejected order");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::StopSignal;
    use crate::kitchen;
    use crate::model::OrderStatus;

    #[tokio::test(start_paused = true)]
    async fn test_stop_drains_queue_before_exiting() {
        let (dispatcher, client, pool) = kitchen::new(1, Duration::from_secs(1));
        let stop = StopSignal::new();

        // Queue up three orders, then ask the dispatcher to stop before it ever runs
        let tickets: Vec<_> = (0..3)
            .map(|_| client.submit(Order::new("Soup", Duration::from_secs(1))).unwrap())
            .collect();
        assert_eq!(client.queue_depth(), 3);
        stop.stop();

        let report = dispatcher.run(pool.clone(), stop.token()).await;
        assert_eq!(report, DispatchReport { dispatched: 3, rejected: 0 });
        assert_eq!(client.queue_depth(), 0);

        for ticket in tickets {
            assert_eq!(ticket.wait().await.unwrap().status(), OrderStatus::Ready);
        }
        pool.shutdown(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_notices_stop_while_idle() {
        let (dispatcher, _client, pool) = kitchen::new(1, Duration::from_millis(200));
        let stop = StopSignal::new();
        let handle = tokio::spawn(dispatcher.run(pool, stop.token()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!handle.is_finished());

        stop.stop();
        let report = tokio::time::timeout(Duration::from_millis(250), handle)
            .await
            .expect("dispatcher should exit within one poll interval")
            .unwrap();
        assert_eq!(report.dispatched, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_order_releases_its_waiter() {
        let (dispatcher, client, pool) = kitchen::new(1, Duration::from_secs(1));
        pool.shutdown(Duration::from_secs(1)).await.unwrap();

        let ticket = client.submit(Order::new("Fish", Duration::from_secs(1))).unwrap();
        let order_id = ticket.order_id();
        drop(client);

        let report = dispatcher.run(pool, StopSignal::new().token()).await;
        assert_eq!(report, DispatchReport { dispatched: 0, rejected: 1 });
        assert_eq!(
            ticket.wait().await.unwrap_err(),
            crate::kitchen::KitchenError::Interrupted(order_id)
        );
    }
}
