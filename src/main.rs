use restaurant_pipeline::lifecycle::{setup_tracing, Restaurant, RestaurantConfig};
use restaurant_pipeline::waiter::RandomMenu;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_RUN_SECS: u64 = 30;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = RestaurantConfig::from_env().map_err(|e| e.to_string())?;
    let run_for = match std::env::var("RESTAURANT_RUN_SECS") {
        Ok(secs) => Duration::from_secs(
            secs.trim()
                .parse()
                .map_err(|_| format!("RESTAURANT_RUN_SECS has an invalid value: {secs:?}"))?,
        ),
        Err(_) => Duration::from_secs(DEFAULT_RUN_SECS),
    };

    let mut restaurant =
        Restaurant::new(config, Arc::new(RandomMenu::default())).map_err(|e| e.to_string())?;
    restaurant.start().map_err(|e| e.to_string())?;
    info!(?run_for, "Restaurant is open");

    tokio::select! {
        _ = tokio::time::sleep(run_for) => {}
        _ = tokio::signal::ctrl_c() => warn!("Interrupted, closing early"),
    }

    let report = restaurant.stop().await.map_err(|e| e.to_string())?;
    for waiter in &report.waiters {
        info!(
            waiter = %waiter.waiter,
            delivered = waiter.delivered.len(),
            abandoned = waiter.abandoned.len(),
            "Shift summary"
        );
    }
    if !report.abandoned_orders.is_empty() {
        let ids: Vec<String> = report.abandoned_orders.iter().map(|id| id.to_string()).collect();
        warn!(orders = %ids.join(", "), "Orders never delivered");
    }

    info!(
        delivered = report.deliveries().count(),
        snapshots = report.snapshots_emitted,
        "Restaurant closed successfully"
    );
    Ok(())
}
