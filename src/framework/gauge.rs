//! Lock-free counters shared between pipeline stages and the monitor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A shared, cloneable counter that never goes below zero.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    value: Arc<AtomicUsize>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrement(&self) {
        let _ = self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1));
    }

    pub fn get(&self) -> usize {
        self.value.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_is_shared_and_saturates() {
        let gauge = Gauge::new();
        let view = gauge.clone();

        gauge.increment();
        gauge.increment();
        assert_eq!(view.get(), 2);

        view.decrement();
        view.decrement();
        view.decrement();
        assert_eq!(gauge.get(), 0);
    }
}
