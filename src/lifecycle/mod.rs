//! # System Lifecycle & Orchestration
//!
//! [`TrackingSystem`] is the conductor: it creates the three resource actors,
//! injects their contexts (event bus, clock, tuning), runs the simulation
//! ticker and the retention timers, and exposes every inbound command.
//!
//! ```text
//!            ┌──────────────── TrackingSystem ────────────────┐
//! commands → │ DeliveryClient  DriverClient  VehicleClient     │
//!            │      │               │             │            │
//!            │ delivery actor  driver actor  vehicle actor     │ → EventBus → subscribers
//!            │      ▲                                          │
//!            │ ticker (interval)   retention timers (per id)   │
//!            │ RouteOptimizer (DashMap cache, providers)       │
//!            └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Dependency Injection via Context
//!
//! Actors are created first and receive their dependencies through
//! `run(context)`, so the delivery actor can publish events and read the clock
//! without owning either.
//!
//! ## Timers
//!
//! - `start()` arms a `tokio::time::interval` (first tick one period after
//!   start, missed ticks delayed rather than bunched).
//! - Completing a delivery spawns a removal task for it after the retention
//!   window. `stop()` aborts the ticker and every pending removal; `start()`
//!   re-arms removals for completed records with the time they have left.
//!
//! ## Graceful Shutdown
//!
//! [`TrackingSystem::shutdown`] stops the timers, waits for them, drops every
//! client, and awaits the actor tasks, which end once their channels close.
//!
//! ## Observability
//!
//! See [`tracing`] for log setup.

pub mod error;
pub mod retention;
pub mod snapshot;
pub mod tracing;
pub mod tracking_system;

pub use self::tracing::setup_tracing;
pub use error::*;
pub use retention::RetentionScheduler;
pub use snapshot::TrackingSnapshot;
pub use tracking_system::*;
