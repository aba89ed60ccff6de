//! # Completion Routing
//!
//! A [`RoutingTable`] delivers each result to exactly the task that asked for it.
//!
//! ## How it works
//!
//! 1. The requester calls [`register`](RoutingTable::register) **before** releasing the work
//!    item. It gets back a [`Completion`], the receiving half of a single-slot
//!    [`oneshot`] channel.
//! 2. Whoever finishes the work calls [`complete`](RoutingTable::complete) with the id. The
//!    entry is removed and the value is written into that one slot.
//! 3. The requester awaits its own `Completion` and nothing else.
//!
//! Because the entry exists before the work can possibly finish, a completion that finds
//! no entry is a broken invariant, reported as [`FrameworkError::RoutingMissing`] instead of
//! being dropped.
//!
//! ```rust
//! use restaurant_pipeline::framework::RoutingTable;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let routes = RoutingTable::<u64, &'static str>::new();
//! let completion = routes.register(7).unwrap();
//!
//! routes.complete(&7, "soup").unwrap();
//! assert_eq!(completion.wait().await.unwrap(), "soup");
//! assert!(routes.complete(&7, "soup").is_err());
//! # }
//! ```

use crate::framework::FrameworkError;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;

struct Routes<K, V> {
    slots: HashMap<K, oneshot::Sender<V>>,
    closed: bool,
}

/// Maps ids to the single-slot completion signal of the task awaiting them.
pub struct RoutingTable<K, V> {
    routes: Arc<Mutex<Routes<K, V>>>,
}

impl<K, V> Clone for RoutingTable<K, V> {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
        }
    }
}

impl<K, V> Default for RoutingTable<K, V> {
    fn default() -> Self {
        Self {
            routes: Arc::new(Mutex::new(Routes {
                slots: HashMap::new(),
                closed: false,
            })),
        }
    }
}

impl<K, V> RoutingTable<K, V>
where
    K: Eq + Hash + Clone + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Routes<K, V>> {
        // The map stays consistent even if a holder panicked: every operation is a
        // single insert or remove.
        self.routes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Installs a route for `id` and returns the slot the caller should await.
    pub fn register(&self, id: K) -> Result<Completion<K, V>, FrameworkError> {
        let mut routes = self.lock();
        if routes.closed {
            return Err(FrameworkError::RoutingClosed);
        }
        if routes.slots.contains_key(&id) {
            return Err(FrameworkError::DuplicateRoute(id.to_string()));
        }
        let (sender, receiver) = oneshot::channel();
        routes.slots.insert(id.clone(), sender);
        debug!(%id, pending = routes.slots.len(), "Route registered");
        Ok(Completion { id, receiver })
    }

    /// Removes the route for `id` and hands `value` to its owner.
    pub fn complete(&self, id: &K, value: V) -> Result<(), FrameworkError> {
        let sender = self
            .lock()
            .slots
            .remove(id)
            .ok_or_else(|| FrameworkError::RoutingMissing(id.to_string()))?;
        sender
            .send(value)
            .map_err(|_| FrameworkError::RecipientGone(id.to_string()))
    }

    /// Withdraws a route whose work item never got released.
    pub fn withdraw(&self, id: &K) -> bool {
        self.lock().slots.remove(id).is_some()
    }

    /// Number of routes still waiting for a completion.
    pub fn pending(&self) -> usize {
        self.lock().slots.len()
    }

    /// Drops every remaining slot and refuses new registrations.
    ///
    /// Waiters on the dropped slots see [`FrameworkError::Interrupted`]. Returns the ids
    /// that never completed.
    pub fn close(&self) -> Vec<K> {
        let mut routes = self.lock();
        routes.closed = true;
        routes.slots.drain().map(|(id, _)| id).collect()
    }
}

/// The receiving end of one route.
#[derive(Debug)]
pub struct Completion<K, V> {
    id: K,
    receiver: oneshot::Receiver<V>,
}

impl<K, V> Completion<K, V> {
    pub fn id(&self) -> &K {
        &self.id
    }

    /// Waits for the value routed to this slot.
    pub async fn wait(self) -> Result<V, FrameworkError> {
        self.receiver.await.map_err(|_| FrameworkError::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_each_completion_reaches_its_own_slot() {
        let routes = RoutingTable::<u64, String>::new();
        let first = routes.register(1).unwrap();
        let second = routes.register(2).unwrap();
        assert_eq!(routes.pending(), 2);

        // Complete out of order
        routes.complete(&2, "two".into()).unwrap();
        routes.complete(&1, "one".into()).unwrap();

        assert_eq!(first.wait().await.unwrap(), "one");
        assert_eq!(second.wait().await.unwrap(), "two");
        assert_eq!(routes.pending(), 0);
    }

    #[tokio::test]
    async fn test_missing_and_duplicate_routes_are_errors() {
        let routes = RoutingTable::<u64, ()>::new();
        assert_eq!(
            routes.complete(&9, ()),
            Err(FrameworkError::RoutingMissing("9".into()))
        );

        let _slot = routes.register(3).unwrap();
        assert_eq!(
            routes.register(3).unwrap_err(),
            FrameworkError::DuplicateRoute("3".into())
        );

        // Removed at most once
        routes.complete(&3, ()).unwrap();
        assert!(routes.complete(&3, ()).is_err());
    }

    #[tokio::test]
    async fn test_dropped_recipient_is_reported() {
        let routes = RoutingTable::<u64, u8>::new();
        drop(routes.register(4).unwrap());
        assert_eq!(
            routes.complete(&4, 0),
            Err(FrameworkError::RecipientGone("4".into()))
        );
    }

    #[tokio::test]
    async fn test_close_interrupts_waiters() {
        let routes = RoutingTable::<u64, u8>::new();
        let slot = routes.register(5).unwrap();
        let withdrawn = routes.register(6).unwrap();
        assert!(routes.withdraw(withdrawn.id()));

        let orphaned = routes.close();
        assert_eq!(orphaned, vec![5]);
        assert_eq!(slot.wait().await, Err(FrameworkError::Interrupted));
        assert_eq!(
            routes.register(7).unwrap_err(),
            FrameworkError::RoutingClosed
        );
    }
}
