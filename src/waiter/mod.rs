//! # Waiters
//!
//! A [`Waiter`] both produces orders and consumes their results. Each pass through its loop
//! takes the waiter through
//!
//! ```text
//! Idle -> GeneratingOrder -> Submitting -> AwaitingCompletion -> Delivering -> Idle
//! ```
//!
//! The waiter waits on the [`OrderTicket`](crate::clients::OrderTicket) of the order it just
//! submitted and on nothing else, so it can only ever deliver its own orders.
//!
//! ## Stopping
//!
//! Stopping is cooperative. The stop token is honoured while the waiter is idle and right
//! before an order would be submitted; once an order is in the kitchen the waiter sees it
//! through to delivery. If the kitchen abandons the order during shutdown the waiter notes
//! it and leaves.

pub mod error;
pub mod menu;

pub use error::*;
pub use menu::*;

use crate::clients::KitchenClient;
use crate::framework::StopToken;
use crate::kitchen::KitchenError;
use crate::model::{Order, OrderId, OrderStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Where a waiter is in its order cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterState {
    Idle,
    GeneratingOrder,
    Submitting,
    AwaitingCompletion,
    Delivering,
}

/// One order a waiter carried all the way to the customer.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub order: Order,
    pub submitted_at: Instant,
    pub ready_at: Instant,
    pub delivered_at: Instant,
}

/// What a waiter did during its shift.
#[derive(Debug, Clone)]
pub struct WaiterReport {
    pub waiter: String,
    pub delivered: Vec<DeliveryRecord>,
    /// Orders the kitchen dropped during shutdown.
    pub abandoned: Vec<OrderId>,
}

/// Takes orders, sends them to the kitchen and delivers them once ready.
pub struct Waiter {
    name: String,
    kitchen: KitchenClient,
    menu: Arc<dyn OrderGenerator>,
    delivery_delay: Duration,
    state: WaiterState,
}

impl Waiter {
    pub fn new(
        name: impl Into<String>,
        kitchen: KitchenClient,
        menu: Arc<dyn OrderGenerator>,
        delivery_delay: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            kitchen,
            menu,
            delivery_delay,
            state: WaiterState::Idle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn enter(&mut self, next: WaiterState) {
        debug!(waiter = %self.name, from = ?self.state, to = ?next, "State");
        self.state = next;
    }

    /// Works order after order until `stop` fires.
    pub async fn run(mut self, stop: StopToken) -> Result<WaiterReport, WaiterError> {
        info!(waiter = %self.name, "Started shift");
        let mut report = WaiterReport {
            waiter: self.name.clone(),
            delivered: Vec::new(),
            abandoned: Vec::new(),
        };

        loop {
            self.enter(WaiterState::Idle);
            let pause = self.menu.next_pause();
            tokio::select! {
                biased;
                _ = stop.stopped() => break,
                _ = tokio::time::sleep(pause) => {}
            }

            self.enter(WaiterState::GeneratingOrder);
            let dish = self.menu.next_dish();
            let mut order = Order::new(dish.dish_name, dish.preparation_time);
            if stop.is_stopped() {
                debug!(waiter = %self.name, %order, "Stop requested, order not submitted");
                break;
            }

            self.enter(WaiterState::Submitting);
            order.assign_waiter(self.name.as_str())?;
            info!(waiter = %self.name, %order, "Took order");
            let ticket = match self.kitchen.submit(order) {
                Ok(ticket) => ticket,
                Err(KitchenError::Closed) => {
                    warn!(waiter = %self.name, "Kitchen closed, ending shift");
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            let submitted_at = Instant::now();
            let expected = ticket.order_id();

            self.enter(WaiterState::AwaitingCompletion);
            debug!(waiter = %self.name, order_id = %expected, "Waiting for order");
            let mut ready = match ticket.wait().await {
                Ok(ready) => ready,
                Err(KitchenError::Interrupted(order_id)) => {
                    warn!(waiter = %self.name, %order_id, "Order abandoned by kitchen");
                    report.abandoned.push(order_id);
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            if ready.id() != expected || ready.waiter_name() != Some(self.name.as_str()) {
                error!(waiter = %self.name, %expected, received = %ready.id(), "Misrouted order");
                return Err(WaiterError::Misrouted {
                    waiter: self.name.clone(),
                    expected,
                    received: ready.id(),
                });
            }
            let ready_at = Instant::now();

            self.enter(WaiterState::Delivering);
            tokio::time::sleep(self.delivery_delay).await;
            ready.advance(OrderStatus::Delivered)?;
            self.kitchen.confirm_delivery();
            info!(waiter = %self.name, order_id = %expected, dish = ready.dish_name(), "Delivered to customer");

            report.delivered.push(DeliveryRecord {
                order: ready,
                submitted_at,
                ready_at,
                delivered_at: Instant::now(),
            });
        }

        self.enter(WaiterState::Idle);
        info!(
            waiter = %self.name,
            delivered = report.delivered.len(),
            abandoned = report.abandoned.len(),
            "Finished shift"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::StopSignal;
    use crate::kitchen;

    #[tokio::test(start_paused = true)]
    async fn test_waiter_delivers_its_own_orders() {
        let (dispatcher, client, pool) = kitchen::new(1, Duration::from_millis(100));
        let kitchen_stop = StopSignal::new();
        let dispatch = tokio::spawn(dispatcher.run(pool.clone(), kitchen_stop.token()));

        let menu = Arc::new(FixedMenu::single(
            "Soup",
            Duration::from_secs(2),
            Duration::from_millis(500),
        ));
        let waiter = Waiter::new("Waiter-1", client.clone(), menu, Duration::from_millis(500));
        let waiter_stop = StopSignal::new();
        let shift = tokio::spawn(waiter.run(waiter_stop.token()));

        // Each cycle: 0.5s pause + 2s cooking + 0.5s delivery
        tokio::time::sleep(Duration::from_millis(6200)).await;
        waiter_stop.stop();
        let report = shift.await.unwrap().unwrap();

        assert_eq!(report.waiter, "Waiter-1");
        assert_eq!(report.delivered.len(), 2);
        assert!(report.abandoned.is_empty());
        for record in &report.delivered {
            assert_eq!(record.order.status(), OrderStatus::Delivered);
            assert_eq!(record.order.waiter_name(), Some("Waiter-1"));
            assert_eq!(record.ready_at - record.submitted_at, Duration::from_secs(2));
            assert_eq!(record.delivered_at - record.ready_at, Duration::from_millis(500));
        }
        assert_eq!(client.awaiting_delivery(), 0);

        kitchen_stop.stop();
        dispatch.await.unwrap();
        pool.shutdown(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_mid_order_still_delivers() {
        let (dispatcher, client, pool) = kitchen::new(1, Duration::from_millis(100));
        let kitchen_stop = StopSignal::new();
        let dispatch = tokio::spawn(dispatcher.run(pool.clone(), kitchen_stop.token()));

        let menu = Arc::new(FixedMenu::single(
            "Steak",
            Duration::from_secs(3),
            Duration::from_millis(100),
        ));
        let waiter = Waiter::new("Waiter-7", client, menu, Duration::from_millis(500));
        let waiter_stop = StopSignal::new();
        let shift = tokio::spawn(waiter.run(waiter_stop.token()));

        // Stop while the steak is on the stove
        tokio::time::sleep(Duration::from_secs(1)).await;
        waiter_stop.stop();
        let report = shift.await.unwrap().unwrap();

        assert_eq!(report.delivered.len(), 1);
        assert_eq!(report.delivered[0].order.dish_name(), "Steak");

        kitchen_stop.stop();
        assert_eq!(dispatch.await.unwrap().dispatched, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_order_ends_shift() {
        let (dispatcher, client, pool) = kitchen::new(1, Duration::from_millis(100));
        let kitchen_stop = StopSignal::new();
        let dispatch = tokio::spawn(dispatcher.run(pool.clone(), kitchen_stop.token()));

        let menu = Arc::new(FixedMenu::single(
            "Fish",
            Duration::from_secs(10),
            Duration::from_millis(100),
        ));
        let waiter = Waiter::new("Waiter-3", client.clone(), menu, Duration::from_millis(500));
        let waiter_stop = StopSignal::new();
        let shift = tokio::spawn(waiter.run(waiter_stop.token()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        waiter_stop.stop();
        kitchen_stop.stop();
        dispatch.await.unwrap();

        // The fish needs 10s; the kitchen only waits 2s before giving up
        assert!(pool.shutdown(Duration::from_secs(2)).await.is_err());
        let orphaned = client.close_routes();
        assert_eq!(orphaned.len(), 1);

        let report = shift.await.unwrap().unwrap();
        assert!(report.delivered.is_empty());
        assert_eq!(report.abandoned, orphaned);
    }
}
