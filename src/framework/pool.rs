//! # Bounded Worker Pool
//!
//! This module defines [`WorkerPool`], a generic executor that runs [`Job`]s with at most
//! `size` of them executing at once.
//!
//! ## Lifecycle of a job
//!
//! 1. [`submit`](WorkerPool::submit) never blocks: the job is recorded as outstanding and
//!    spawned onto its own Tokio task right away.
//! 2. The task waits for one of `size` semaphore permits. Only once it holds a permit does
//!    it count towards [`active_count`](WorkerPool::active_count).
//! 3. The job runs with the pool's shared context (injected at construction, the same
//!    late-binding idea as an actor's `run(context)`).
//! 4. The outcome is settled: success, failure (logged and counted) or abandonment.
//!
//! ## Shutdown
//!
//! [`shutdown`](WorkerPool::shutdown) stops new submissions and gives every outstanding job
//! (running or still waiting for a permit) a bounded amount of time. When the time runs
//! out, the remaining jobs are cancelled at their current suspension point and reported as
//! abandoned. Nothing is retried.

use crate::framework::shutdown::StopSignal;
use crate::framework::FrameworkError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};

/// A unit of work the [`WorkerPool`] can execute.
///
/// # Cancellation
/// A job may be dropped at any `.await` inside [`run`](Job::run) when the pool is forced
/// to shut down. Work between two suspension points is never split, so a job that has
/// already finished its last await always reports its outcome.
#[async_trait]
pub trait Job: Send + 'static {
    /// Identifier used in logs and in the abandoned-job report.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;

    /// Shared dependencies handed to every job the pool runs.
    type Context: Send + Sync + 'static;

    /// The error a job can fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    async fn run(self, ctx: &Self::Context) -> Result<(), Self::Error>;
}

struct Shared<J: Job> {
    job_type: &'static str,
    size: usize,
    permits: Semaphore,
    context: J::Context,
    accepting: AtomicBool,
    active: AtomicUsize,
    failed: AtomicUsize,
    outstanding: watch::Sender<HashSet<J::Id>>,
    abandoned: Mutex<Vec<J::Id>>,
    cancel: StopSignal,
}

/// Executes submitted jobs with bounded parallelism.
///
/// Cheap to clone; every clone drives the same pool.
pub struct WorkerPool<J: Job> {
    shared: Arc<Shared<J>>,
}

impl<J: Job> Clone for WorkerPool<J> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<J: Job> WorkerPool<J> {
    /// Creates a pool that runs at most `size` jobs at a time.
    ///
    /// `size` is clamped to at least one worker.
    pub fn new(size: usize, context: J::Context) -> Self {
        let size = size.max(1);
        // Extract just the type name (e.g., "CookingTask")
        let job_type = std::any::type_name::<J>()
            .split("::")
            .last()
            .unwrap_or("Job");
        let (outstanding, _) = watch::channel(HashSet::new());
        info!(job_type, size, "Worker pool started");

        Self {
            shared: Arc::new(Shared {
                job_type,
                size,
                permits: Semaphore::new(size),
                context,
                accepting: AtomicBool::new(true),
                active: AtomicUsize::new(0),
                failed: AtomicUsize::new(0),
                outstanding,
                abandoned: Mutex::new(Vec::new()),
                cancel: StopSignal::new(),
            }),
        }
    }

    /// Queues `job` for execution without waiting for a free worker.
    pub fn submit(&self, job: J) -> Result<(), FrameworkError> {
        let shared = &self.shared;
        if !shared.accepting.load(Ordering::SeqCst) {
            warn!(job_type = shared.job_type, id = %job.id(), "Rejected, pool closed");
            return Err(FrameworkError::PoolClosed);
        }

        let id = job.id();
        let duplicate = !shared.outstanding.send_if_modified(|ids| ids.insert(id.clone()));
        if duplicate {
            return Err(FrameworkError::DuplicateJob(id.to_string()));
        }
        debug!(job_type = shared.job_type, %id, "Submitted");

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let mut settlement = Settlement {
                shared: &*shared,
                id,
                settled: false,
            };
            let cancel = shared.cancel.token();
            tokio::select! {
                biased;
                _ = cancel.stopped() => {}
                result = shared.execute(job) => {
                    match result {
                        Ok(()) => {}
                        Err(e) => {
                            shared.failed.fetch_add(1, Ordering::SeqCst);
                            error!(job_type = shared.job_type, id = %settlement.id, error = %e, "Job failed");
                        }
                    }
                    settlement.settled = true;
                }
            }
        });
        Ok(())
    }

    /// Workers currently executing a job. Jobs still waiting for a permit are not counted.
    pub fn active_count(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Jobs submitted but not settled yet.
    pub fn outstanding_count(&self) -> usize {
        self.shared.outstanding.borrow().len()
    }

    pub fn failed_count(&self) -> usize {
        self.shared.failed.load(Ordering::SeqCst)
    }

    pub fn size(&self) -> usize {
        self.shared.size
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.accepting.load(Ordering::SeqCst)
    }

    /// Ids of jobs that were cancelled or lost before finishing.
    pub fn abandoned(&self) -> Vec<J::Id> {
        self.shared
            .abandoned
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    /// Stops accepting jobs and drains the outstanding ones.
    ///
    /// Waits up to `timeout` for every outstanding job; whatever is still pending after
    /// that is cancelled. Returns [`FrameworkError::DrainTimeout`] when anything had to be
    /// abandoned.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), FrameworkError> {
        let shared = &self.shared;
        shared.accepting.store(false, Ordering::SeqCst);
        info!(
            job_type = shared.job_type,
            outstanding = self.outstanding_count(),
            ?timeout,
            "Draining worker pool"
        );

        let mut remaining = shared.outstanding.subscribe();
        let drained = matches!(
            tokio::time::timeout(timeout, remaining.wait_for(HashSet::is_empty)).await,
            Ok(Ok(_))
        );

        if !drained {
            warn!(
                job_type = shared.job_type,
                outstanding = self.outstanding_count(),
                "Drain timed out, cancelling remaining jobs"
            );
            shared.cancel.stop();
            // Cancelled jobs settle at their next poll, so this resolves promptly.
            let _ = remaining.wait_for(HashSet::is_empty).await;
        }

        let abandoned = self.abandoned().len();
        if abandoned == 0 {
            info!(job_type = shared.job_type, "Worker pool drained");
            Ok(())
        } else {
            warn!(job_type = shared.job_type, abandoned, "Worker pool shut down with abandoned jobs");
            Err(FrameworkError::DrainTimeout { abandoned })
        }
    }
}

impl<J: Job> Shared<J> {
    async fn execute(&self, job: J) -> Result<(), J::Error> {
        // The semaphore is never closed, so a failed acquire cannot happen in practice.
        let Ok(_permit) = self.permits.acquire().await else {
            return Ok(());
        };
        let _active = ActiveWorker::enter(&self.active);
        job.run(&self.context).await
    }
}

/// Counts a worker as active for as long as it lives.
struct ActiveWorker<'a> {
    active: &'a AtomicUsize,
}

impl<'a> ActiveWorker<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for ActiveWorker<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Removes a job from the outstanding set however its task ends.
///
/// A task that is cancelled or panics never marks itself settled, so the job is
/// recorded as abandoned on the way out.
struct Settlement<'a, J: Job> {
    shared: &'a Shared<J>,
    id: J::Id,
    settled: bool,
}

impl<J: Job> Drop for Settlement<'_, J> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(job_type = self.shared.job_type, id = %self.id, "Job abandoned");
            if let Ok(mut abandoned) = self.shared.abandoned.lock() {
                abandoned.push(self.id.clone());
            }
        }
        self.shared.outstanding.send_modify(|ids| {
            ids.remove(&self.id);
        });
    }
}
