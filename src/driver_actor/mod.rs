//! # Driver Actor
//!
//! Holds the latest [`DriverLocation`] per driver. Every report replaces the
//! previous one (`Put`) and publishes `location_updated`.

pub mod entity;
pub mod error;

pub use error::*;

use crate::events::EventBus;
use crate::model::DriverLocation;
use actor_framework::{ResourceActor, ResourceClient};

/// Dependencies handed to the driver actor's hooks.
#[derive(Clone)]
pub struct DriverContext {
    pub events: EventBus,
}

/// Creates a new driver actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<DriverLocation>, ResourceClient<DriverLocation>) {
    ResourceActor::new(buffer_size)
}
