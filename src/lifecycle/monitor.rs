//! Periodic, read-only view of the pipeline.

use crate::clients::KitchenClient;
use crate::framework::StopToken;
use crate::kitchen::CookingWorkerPool;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Point-in-time counters describing the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    /// Orders waiting in the kitchen queue.
    pub queue_depth: usize,
    /// Orders that are ready but not yet delivered.
    pub awaiting_delivery: usize,
    /// Cooks currently preparing a dish.
    pub active_cooks: usize,
    pub kitchen_size: usize,
}

/// Reads pipeline counters without touching pipeline state.
#[derive(Clone)]
pub struct PipelineProbe {
    kitchen: KitchenClient,
    pool: CookingWorkerPool,
}

impl PipelineProbe {
    pub fn new(kitchen: KitchenClient, pool: CookingWorkerPool) -> Self {
        Self { kitchen, pool }
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            queue_depth: self.kitchen.queue_depth(),
            awaiting_delivery: self.kitchen.awaiting_delivery(),
            active_cooks: self.pool.active_count(),
            kitchen_size: self.pool.size(),
        }
    }
}

/// Logs a [`PipelineSnapshot`] every `interval` until stopped.
pub struct Monitor {
    probe: PipelineProbe,
    interval: Duration,
}

impl Monitor {
    pub fn new(probe: PipelineProbe, interval: Duration) -> Self {
        Self { probe, interval }
    }

    /// Returns how many snapshots were emitted.
    pub async fn run(self, stop: StopToken) -> usize {
        let mut emitted = 0;
        loop {
            tokio::select! {
                biased;
                _ = stop.stopped() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
            let snapshot = self.probe.snapshot();
            info!(
                queue_depth = snapshot.queue_depth,
                ready = snapshot.awaiting_delivery,
                active_cooks = snapshot.active_cooks,
                kitchen_size = snapshot.kitchen_size,
                "Pipeline snapshot"
            );
            emitted += 1;
        }
        emitted
    }
}
