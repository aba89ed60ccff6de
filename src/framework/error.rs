//! # Framework Errors
//!
//! Errors raised by the generic pipeline plumbing (worker pool and routing table).
//! Domain layers wrap these with `#[from]` so callers can still match on the cause.

/// Errors that can occur within the pipeline framework itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FrameworkError {
    /// A suspension point was cancelled because shutdown is in progress.
    #[error("Wait interrupted by shutdown")]
    Interrupted,
    /// The worker pool no longer accepts submissions.
    #[error("Worker pool closed")]
    PoolClosed,
    /// A completion arrived for an id nobody is waiting on.
    #[error("No route registered for {0}")]
    RoutingMissing(String),
    /// A second route was registered for an id that already has one.
    #[error("Route already registered for {0}")]
    DuplicateRoute(String),
    /// A job with the same id is already outstanding.
    #[error("Job {0} already submitted")]
    DuplicateJob(String),
    /// The routing table was closed during shutdown.
    #[error("Routing table closed")]
    RoutingClosed,
    /// The registered recipient stopped listening before the completion arrived.
    #[error("Recipient for {0} is gone")]
    RecipientGone(String),
    /// Shutdown gave up waiting and cancelled the remaining jobs.
    #[error("Drain timed out, {abandoned} job(s) abandoned")]
    DrainTimeout { abandoned: usize },
}
