//! # Vehicle Actor
//!
//! Holds the latest [`VehicleStatus`] per vehicle; last write wins and every
//! write publishes `vehicle_status_updated`.

pub mod entity;
pub mod error;

pub use error::*;

use crate::events::EventBus;
use crate::model::VehicleStatus;
use actor_framework::{ResourceActor, ResourceClient};

#[derive(Clone)]
pub struct VehicleContext {
    pub events: EventBus,
}

/// Creates a new vehicle actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<VehicleStatus>, ResourceClient<VehicleStatus>) {
    ResourceActor::new(buffer_size)
}
