//! Type-safe handles around the pipeline's channels.

pub mod kitchen_client;

pub use kitchen_client::*;
