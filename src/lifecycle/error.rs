//! Errors surfaced by [`TrackingSystem`](super::TrackingSystem) operations
//! that span more than one actor.

use crate::delivery_actor::DeliveryError;
use crate::driver_actor::DriverError;
use crate::geo::InvalidCoordinate;
use crate::routing::RoutingError;
use crate::vehicle_actor::VehicleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Vehicle(#[from] VehicleError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
