//! # Fleet Dispatch
//!
//! Route optimization and live delivery tracking for a delivery fleet, built
//! on resource-oriented actors.
//!
//! ## Core Concepts
//!
//! ### One actor per store
//! Deliveries, driver positions and vehicle telemetry each live in their own
//! [`ResourceActor`](actor_framework::ResourceActor). Requests are processed
//! sequentially, so state needs no locks and a delivery's events are published
//! in the order its mutations happened.
//!
//! ### Late-bound context
//! Actors get their dependencies (event bus, clock, tuning) through
//! `run(context)`; see [`lifecycle`].
//!
//! ### Injected time and randomness
//! Traffic jitter, synthetic incidents, waypoint deviation and every timestamp
//! come from [`env`], so tests pin them with `ManualClock` and `FixedRandom`.
//!
//! ## Module Tour
//!
//! - [`geo`] - Haversine distance, bearing, great-circle stepping
//! - [`routing`] - costing, route cache, [`RouteOptimizer`](routing::RouteOptimizer), nearest-neighbour ordering
//! - [`model`] - routes, tracking records, driver and vehicle state
//! - [`delivery_actor`], [`driver_actor`], [`vehicle_actor`] - [`ActorEntity`](actor_framework::ActorEntity) implementations
//! - [`clients`] - typed wrappers over the actors
//! - [`events`] - named-event pub/sub with per-subscriber isolation
//! - [`lifecycle`] - [`TrackingSystem`](lifecycle::TrackingSystem), simulation ticker, retention, snapshots
//! - [`config`] - TOML configuration with defaults and validation
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- --ticks 20
//! ```

pub mod clients;
pub mod config;
pub mod delivery_actor;
pub mod driver_actor;
pub mod env;
pub mod events;
pub mod geo;
pub mod lifecycle;
pub mod model;
pub mod routing;
pub mod vehicle_actor;
