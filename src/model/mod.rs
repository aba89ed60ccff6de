//! Pure data structures moving through the pipeline.

pub mod ids;
pub mod order;

pub use ids::*;
pub use order::*;
