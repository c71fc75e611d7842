//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient).
//!
//! Each wrapper translates framework errors into its actor's error enum and
//! exposes domain verbs instead of raw CRUD requests. Reads (`get`, `list`)
//! come from [`ActorClient`].

pub mod delivery_client;
pub mod driver_client;
pub mod vehicle_client;

pub use actor_framework::ActorClient;
pub use delivery_client::*;
pub use driver_client::*;
pub use vehicle_client::*;
