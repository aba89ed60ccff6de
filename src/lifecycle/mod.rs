//! Opening, observing and closing the restaurant.

pub mod config;
pub mod error;
pub mod monitor;
pub mod restaurant;
pub mod tracing;

pub use config::*;
pub use error::*;
pub use monitor::*;
pub use restaurant::*;
pub use self::tracing::setup_tracing;
