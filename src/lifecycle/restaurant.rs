use crate::clients::KitchenClient;
use crate::framework::StopSignal;
use crate::kitchen::{self, CookingWorkerPool, DispatchReport, KitchenDispatcher};
use crate::lifecycle::{
    Monitor, PipelineProbe, PipelineSnapshot, RestaurantConfig, RestaurantError,
};
use crate::model::OrderId;
use crate::waiter::{DeliveryRecord, OrderGenerator, Waiter, WaiterError, WaiterReport};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Whether the restaurant has been opened yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestaurantState {
    Closed,
    Open,
}

/// What happened while the restaurant was closing.
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    /// Reports of the waiters that finished their shift in time.
    pub waiters: Vec<WaiterReport>,
    /// Waiters that missed the join timeout and were left to finish on their own.
    pub abandoned_waiters: Vec<String>,
    /// Waiters whose shift ended with an error.
    pub failed_waiters: Vec<String>,
    pub dispatch: DispatchReport,
    /// `true` when the kitchen finished every order within the drain timeout.
    pub drained_cleanly: bool,
    /// Orders that were submitted but will never be delivered.
    pub abandoned_orders: Vec<OrderId>,
    /// Cooking jobs that failed (for example because their route was missing).
    pub failed_jobs: usize,
    pub snapshots_emitted: usize,
}

impl ShutdownReport {
    /// Every delivery made by a waiter that reported back.
    pub fn deliveries(&self) -> impl Iterator<Item = &DeliveryRecord> {
        self.waiters.iter().flat_map(|report| report.delivered.iter())
    }
}

/// The main orchestrator for the order pipeline.
///
/// `Restaurant` is responsible for:
/// - **Wiring**: one kitchen queue, one routing table and one cooking pool shared by every
///   waiter
/// - **Lifecycle Management**: starting the dispatcher, the waiters and the monitor, and
///   closing them down in the right order
/// - **Introspection**: [`snapshot`](Restaurant::snapshot) at any time, plus a periodic
///   monitor while open
///
/// # Example
///
/// ```rust,no_run
/// use restaurant_pipeline::lifecycle::{Restaurant, RestaurantConfig};
/// use restaurant_pipeline::waiter::RandomMenu;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut restaurant = Restaurant::new(RestaurantConfig::new(3, 4), Arc::new(RandomMenu::default()))?;
/// restaurant.start()?;
///
/// tokio::time::sleep(Duration::from_secs(30)).await;
///
/// let report = restaurant.stop().await?;
/// println!("{} orders delivered", report.deliveries().count());
/// # Ok(())
/// # }
/// ```
pub struct Restaurant {
    config: RestaurantConfig,
    state: RestaurantState,
    kitchen: KitchenClient,
    pool: CookingWorkerPool,
    probe: PipelineProbe,
    dispatcher: Option<KitchenDispatcher>,
    waiters: Vec<Waiter>,
    waiter_stop: StopSignal,
    dispatcher_stop: StopSignal,
    monitor_stop: StopSignal,
    waiter_handles: Vec<(String, JoinHandle<Result<WaiterReport, WaiterError>>)>,
    dispatcher_handle: Option<JoinHandle<DispatchReport>>,
    monitor_handle: Option<JoinHandle<usize>>,
}

impl Restaurant {
    /// Builds the kitchen and staffs the floor with `config.waiter_count` waiters.
    ///
    /// Nothing runs until [`start`](Restaurant::start) is called.
    pub fn new(
        config: RestaurantConfig,
        menu: Arc<dyn OrderGenerator>,
    ) -> Result<Self, RestaurantError> {
        config.validate()?;

        let (dispatcher, kitchen, pool) =
            kitchen::new(config.kitchen_size, config.dispatch_poll_interval);
        let waiters = (1..=config.waiter_count)
            .map(|i| {
                Waiter::new(
                    format!("Waiter-{i}"),
                    kitchen.clone(),
                    Arc::clone(&menu),
                    config.delivery_delay,
                )
            })
            .collect();
        let probe = PipelineProbe::new(kitchen.clone(), pool.clone());

        Ok(Self {
            config,
            state: RestaurantState::Closed,
            kitchen,
            pool,
            probe,
            dispatcher: Some(dispatcher),
            waiters,
            waiter_stop: StopSignal::new(),
            dispatcher_stop: StopSignal::new(),
            monitor_stop: StopSignal::new(),
            waiter_handles: Vec::new(),
            dispatcher_handle: None,
            monitor_handle: None,
        })
    }

    pub fn state(&self) -> RestaurantState {
        self.state
    }

    pub fn config(&self) -> &RestaurantConfig {
        &self.config
    }

    /// Current pipeline counters.
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.probe.snapshot()
    }

    /// Opens the restaurant: dispatcher, waiters and monitor start running.
    pub fn start(&mut self) -> Result<(), RestaurantError> {
        let Some(dispatcher) = self.dispatcher.take() else {
            return Err(RestaurantError::AlreadyOpen);
        };
        info!(
            kitchen_size = self.config.kitchen_size,
            waiters = self.config.waiter_count,
            "Restaurant opening"
        );

        self.dispatcher_handle = Some(tokio::spawn(
            dispatcher.run(self.pool.clone(), self.dispatcher_stop.token()),
        ));

        for waiter in self.waiters.drain(..) {
            let name = waiter.name().to_string();
            let handle = tokio::spawn(waiter.run(self.waiter_stop.token()));
            self.waiter_handles.push((name, handle));
        }

        let monitor = Monitor::new(self.probe.clone(), self.config.monitor_interval);
        self.monitor_handle = Some(tokio::spawn(monitor.run(self.monitor_stop.token())));

        self.state = RestaurantState::Open;
        Ok(())
    }

    /// Closes the restaurant.
    ///
    /// # Shutdown Process
    ///
    /// 1. Stop the monitor.
    /// 2. Ask every waiter to finish its current order, waiting up to
    ///    `waiter_join_timeout` for each. Stragglers are logged and left running; they are
    ///    never killed.
    /// 3. Stop the dispatcher once the waiters are done; it drains the queue before exiting.
    /// 4. Drain the cooking pool for up to `kitchen_drain_timeout`, cancelling whatever is
    ///    still cooking after that.
    /// 5. Close routing, releasing any waiter still parked on an abandoned order.
    pub async fn stop(mut self) -> Result<ShutdownReport, RestaurantError> {
        info!(state = ?self.state, "Restaurant closing");

        // =====================================================================
        // Step 1: Monitor
        // =====================================================================
        self.monitor_stop.stop();
        let snapshots_emitted = match self.monitor_handle.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => 0,
        };

        // =====================================================================
        // Step 2: Waiters
        // =====================================================================
        self.waiter_stop.stop();
        let mut waiters = Vec::new();
        let mut abandoned_waiters = Vec::new();
        let mut failed_waiters = Vec::new();

        for (name, mut handle) in self.waiter_handles.drain(..) {
            match tokio::time::timeout(self.config.waiter_join_timeout, &mut handle).await {
                Ok(Ok(Ok(report))) => waiters.push(report),
                Ok(Ok(Err(e))) => {
                    error!(waiter = %name, error = %e, "Waiter failed");
                    failed_waiters.push(name);
                }
                Ok(Err(e)) => {
                    error!(waiter = %name, error = %e, "Waiter task failed");
                    failed_waiters.push(name);
                }
                Err(_) => {
                    // Dropping the handle detaches the task; it keeps running.
                    warn!(waiter = %name, "Waiter did not finish in time, abandoning");
                    abandoned_waiters.push(name);
                }
            }
        }

        // =====================================================================
        // Step 3: Dispatcher
        // =====================================================================
        self.dispatcher_stop.stop();
        let dispatch = match self.dispatcher_handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| RestaurantError::DispatcherFailed(e.to_string()))?,
            None => DispatchReport::default(),
        };

        // =====================================================================
        // Step 4: Kitchen
        // =====================================================================
        let drained_cleanly = match self.pool.shutdown(self.config.kitchen_drain_timeout).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Kitchen did not drain in time");
                false
            }
        };

        // =====================================================================
        // Step 5: Routing
        // =====================================================================
        let mut abandoned_orders = self.pool.abandoned();
        abandoned_orders.extend(self.kitchen.close_routes());
        abandoned_orders.sort();
        abandoned_orders.dedup();

        let report = ShutdownReport {
            waiters,
            abandoned_waiters,
            failed_waiters,
            dispatch,
            drained_cleanly,
            abandoned_orders,
            failed_jobs: self.pool.failed_count(),
            snapshots_emitted,
        };
        info!(
            delivered = report.deliveries().count(),
            abandoned_orders = report.abandoned_orders.len(),
            abandoned_waiters = report.abandoned_waiters.len(),
            drained_cleanly,
            "Restaurant closed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ConfigError;
    use crate::waiter::FixedMenu;
    use std::time::Duration;

    fn soup() -> Arc<dyn OrderGenerator> {
        Arc::new(FixedMenu::single(
            "Soup",
            Duration::from_secs(1),
            Duration::from_millis(500),
        ))
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Restaurant::new(RestaurantConfig::new(0, 2), soup());
        assert_eq!(
            result.err(),
            Some(RestaurantError::Config(ConfigError::Zero("kitchen_size")))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_rejected() {
        let mut restaurant = Restaurant::new(RestaurantConfig::new(2, 1), soup()).unwrap();
        assert_eq!(restaurant.state(), RestaurantState::Closed);

        restaurant.start().unwrap();
        assert_eq!(restaurant.state(), RestaurantState::Open);
        assert_eq!(restaurant.start(), Err(RestaurantError::AlreadyOpen));

        let report = restaurant.stop().await.unwrap();
        assert!(report.drained_cleanly);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_start() {
        let restaurant = Restaurant::new(RestaurantConfig::new(3, 4), soup()).unwrap();
        assert_eq!(restaurant.snapshot().kitchen_size, 3);
        assert_eq!(restaurant.snapshot().active_cooks, 0);

        let report = restaurant.stop().await.unwrap();
        assert!(report.waiters.is_empty());
        assert_eq!(report.dispatch, DispatchReport::default());
        assert!(report.abandoned_orders.is_empty());
        assert_eq!(report.snapshots_emitted, 0);
    }
}
