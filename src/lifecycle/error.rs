//! Error types for the restaurant orchestrator.

use crate::lifecycle::ConfigError;
use thiserror::Error;

/// Errors raised while opening or closing a [`Restaurant`](crate::lifecycle::Restaurant).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RestaurantError {
    /// `start()` was called on a restaurant that is already open.
    #[error("Restaurant is already open")]
    AlreadyOpen,

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dispatcher task panicked or was cancelled.
    #[error("Dispatcher task failed: {0}")]
    DispatcherFailed(String),
}
