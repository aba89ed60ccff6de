//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate for the whole
//! pipeline.
//!
//! ## Configuration
//!
//! Output uses the compact format with the module prefix hidden (`with_target(false)`).
//! Every event carries the fields that identify it instead: `waiter`, `order_id`, `dish`.
//! The level comes from `RUST_LOG` and falls back to `info`.
//!
//! ```bash
//! # Lifecycle events only
//! RUST_LOG=info cargo run
//!
//! # Waiter state changes, routing and dispatch
//! RUST_LOG=debug cargo run
//!
//! # Only the kitchen
//! RUST_LOG=restaurant_pipeline::kitchen=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! At `info`, a single order reads like this:
//!
//! ```text
//! INFO Took order waiter="Waiter-2" order=Order #7 [Pasta], prep time: 3s
//! INFO Started cooking order_id=order_7 dish="Pasta"
//! INFO Finished cooking order_id=order_7 dish="Pasta"
//! INFO Delivered to customer waiter="Waiter-2" order_id=order_7 dish="Pasta"
//! ```
//!
//! The monitor adds a `Pipeline snapshot` line every interval, and shutdown logs one
//! line per stage. Abandoned waiters and undrained orders are logged at `warn`; routing
//! failures at `error`.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
