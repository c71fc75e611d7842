//! # Delivery Actor
//!
//! Owns every live [`DeliveryTracking`] record. All mutations (location fixes,
//! simulation steps, completion) are applied one at a time inside the actor,
//! and the matching event is published from the same step, so subscribers see
//! a delivery's events in mutation order.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation
//! - [`actions`] - [`DeliveryAction`] (`Advance`, `Complete`)
//! - [`error`] - [`DeliveryError`]
//!
//! ## Operations
//!
//! | Request | Effect | Event |
//! |---|---|---|
//! | `Create(StartTracking)` | new record, `Departed` checkpoint | `delivery_started` |
//! | `Update(LocationFix)` | progress, ETA, milestones | `delivery_updated` |
//! | `Action(Advance)` | one simulated step or arrival | `delivery_updated` / `delivery_completed` |
//! | `Action(Complete)` | terminal state, `Delivered` checkpoint | `delivery_completed` (first time only) |
//! | `Delete` | retention expiry | none |

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::env::SharedClock;
use crate::events::EventBus;
use crate::model::DeliveryTracking;
use actor_framework::{ResourceActor, ResourceClient};

/// Dependencies handed to the delivery actor's hooks.
#[derive(Clone)]
pub struct DeliveryContext {
    pub events: EventBus,
    pub clock: SharedClock,
    /// Used for ETAs.
    pub average_speed_kmh: f64,
}

/// Creates a new delivery actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<DeliveryTracking>, ResourceClient<DeliveryTracking>) {
    ResourceActor::new(buffer_size)
}
