//! Plain data shared by the actors, the optimizer and the event bus.
//!
//! The actor-facing types ([`DeliveryTracking`], [`DriverLocation`],
//! [`VehicleStatus`]) implement [`ActorEntity`](actor_framework::ActorEntity) in
//! their respective `*_actor` modules.

pub mod delivery;
pub mod driver;
pub mod ids;
pub mod route;
pub mod vehicle;

pub use delivery::*;
pub use driver::*;
pub use ids::*;
pub use route::*;
pub use vehicle::*;
