//! # Restaurant Pipeline
//!
//! > **A concurrent order pipeline: waiters, a kitchen queue and a bounded pool of cooks.**
//!
//! Waiters take orders and hand them to the kitchen. A dispatcher moves queued orders
//! into a pool of `K` cooks, so at most `K` dishes are ever on the stove. When a dish is
//! ready it is routed back to the one waiter that ordered it, who delivers it to the
//! customer.
//!
//! ## 🏗️ Design
//!
//! ### 1. Per-Order Completion Routing
//! Every submitted order gets its own single-slot completion channel, registered before
//! the order enters the queue. A waiter awaits that slot and nothing else, so no waiter
//! can pick up another waiter's order. See [`framework::routing`].
//!
//! ### 2. Bounded Parallelism
//! The dispatcher never cooks. It submits each order to a [`WorkerPool`](framework::WorkerPool)
//! whose semaphore admits at most `K` jobs at a time; the rest wait for a permit.
//!
//! ### 3. Cooperative Shutdown
//! Stopping is a signal, never a kill. Waiters finish the order in hand, the dispatcher
//! drains its queue, and the kitchen gets a bounded window to finish cooking. Whatever is
//! left after that is reported as abandoned. See [`Restaurant::stop`](lifecycle::Restaurant::stop).
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields. See the [`lifecycle::tracing`] module.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Domain-free building blocks: the worker pool, the routing table, stop signals and
//! counters.
//!
//! ### 2. The Data ([`model`])
//! [`Order`](model::Order), its status machine and the order id generator.
//!
//! ### 3. The Kitchen ([`kitchen`]) and its Interface ([`clients`])
//! The cooking job and the dispatcher; waiters only ever see
//! [`KitchenClient`](clients::KitchenClient).
//!
//! ### 4. The Floor ([`waiter`])
//! The waiter state machine and pluggable order generation.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! [`Restaurant`](lifecycle::Restaurant) wires everything together, runs the monitor and
//! owns the shutdown sequence.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # A 30 second service with 3 cooks and 4 waiters
//! RUST_LOG=info cargo run
//!
//! # A shorter, busier one
//! RESTAURANT_RUN_SECS=10 RESTAURANT_WAITERS=8 cargo run
//! ```

pub mod clients;
pub mod framework;
pub mod kitchen;
pub mod lifecycle;
pub mod model;
pub mod waiter;
