//! Generic pipeline plumbing.
//!
//! This module provides the building blocks the restaurant is assembled from. None of
//! them know about orders or dishes.
//!
//! # Main Components
//!
//! - [`WorkerPool`] - Bounded-parallelism executor for [`Job`]s, with drain-then-cancel shutdown
//! - [`RoutingTable`] - Delivers each completion to the single task waiting for it
//! - [`StopSignal`] / [`StopToken`] - Cooperative cancellation for long-running loops
//! - [`Gauge`] - Shared counters read by the monitor
//! - [`FrameworkError`] - Common error types

pub mod error;
pub mod gauge;
pub mod pool;
pub mod routing;
pub mod shutdown;

// Re-export core types for convenience
pub use error::FrameworkError;
pub use gauge::Gauge;
pub use pool::{Job, WorkerPool};
pub use routing::{Completion, RoutingTable};
pub use shutdown::{StopSignal, StopToken};
