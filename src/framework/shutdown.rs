//! # Stop Signals
//!
//! Cooperative cancellation for long-running loops.
//!
//! A [`StopSignal`] is held by whoever decides when a component should wind down; every
//! task that must observe the decision gets a [`StopToken`]. Tokens are checked at each
//! resumption (`is_stopped`) and raced against each suspension point (`stopped`), so no
//! loop ever depends on an unsynchronized boolean.
//!
//! Built on [`tokio::sync::watch`]: the latest value is always visible to late subscribers,
//! and a dropped signal counts as stopped.

use tokio::sync::watch;

/// The owning half of a stop request.
#[derive(Debug)]
pub struct StopSignal {
    sender: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// Hands out a token observing this signal.
    pub fn token(&self) -> StopToken {
        StopToken {
            receiver: self.sender.subscribe(),
        }
    }

    /// Requests a stop. Calling it again is a no-op.
    pub fn stop(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A cloneable view of a [`StopSignal`].
#[derive(Debug, Clone)]
pub struct StopToken {
    receiver: watch::Receiver<bool>,
}

impl StopToken {
    pub fn is_stopped(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once a stop has been requested (or the signal was dropped).
    pub async fn stopped(&self) {
        let mut receiver = self.receiver.clone();
        // Err means the signal is gone, which we treat as a stop as well.
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_token_observes_stop() {
        let signal = StopSignal::new();
        let token = signal.token();
        assert!(!token.is_stopped());

        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.stopped().await }
        });

        signal.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("token never resolved")
            .unwrap();
        assert!(token.is_stopped());
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn test_late_token_sees_earlier_stop() {
        let signal = StopSignal::new();
        signal.stop();
        signal.stop();

        let token = signal.token();
        assert!(token.is_stopped());
        token.stopped().await;
    }

    #[tokio::test]
    async fn test_dropped_signal_counts_as_stop() {
        let signal = StopSignal::new();
        let token = signal.token();
        drop(signal);

        tokio::time::timeout(Duration::from_secs(1), token.stopped())
            .await
            .expect("dropped signal should release waiters");
    }
}
