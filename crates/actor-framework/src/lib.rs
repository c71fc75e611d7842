//! # Actor Framework
//!
//! Building blocks for type-safe resource actors on Tokio: each resource type
//! (deliveries, driver positions, vehicle telemetry) lives in its own actor task
//! that owns a keyed store and processes requests sequentially.
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): domain state and lifecycle hooks.
//! 2. **Runtime** ([`ResourceActor`]): the message loop that owns the store.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed request API.
//!
//! ## Example
//!
//! ```rust
//! use actor_framework::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Beacon { id: String, battery: u8 }
//! #[derive(Debug)] struct BeaconCreate { battery: u8 }
//! #[derive(Debug)] enum BeaconAction { Drain(u8) }
//! #[derive(Debug, thiserror::Error)] #[error("beacon error")] struct BeaconError;
//!
//! #[async_trait]
//! impl ActorEntity for Beacon {
//!     type Id = String;
//!     type Create = BeaconCreate;
//!     type Update = ();
//!     type Action = BeaconAction;
//!     type ActionResult = u8;
//!     type Context = ();
//!     type Error = BeaconError;
//!
//!     fn from_create_params(id: String, params: BeaconCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, battery: params.battery })
//!     }
//!     async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, action: BeaconAction, _: &()) -> Result<u8, Self::Error> {
//!         match action {
//!             BeaconAction::Drain(n) => {
//!                 self.battery = self.battery.saturating_sub(n);
//!                 Ok(self.battery)
//!             }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Beacon>::new(8);
//!     tokio::spawn(actor.run(()));
//!
//!     client.create("b1".into(), BeaconCreate { battery: 90 }).await.unwrap();
//!     let left = client.perform_action("b1".into(), BeaconAction::Drain(15)).await.unwrap();
//!     assert_eq!(left, 75);
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task and handles one request at a time.
//! - Different actors run in parallel; they never share mutable state.
//! - Side effects raised from hooks (e.g. published events) therefore follow the
//!   order in which requests for an id were received.
//!
//! ## Testing
//!
//! [`mock`] provides `MockClient` and raw-channel helpers to test client wrappers
//! without spawning actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
