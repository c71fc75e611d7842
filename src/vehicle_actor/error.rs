//! Error types for the vehicle actor.

use crate::geo::InvalidCoordinate;
use crate::model::VehicleId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VehicleError {
    #[error("Vehicle not found: {0}")]
    NotFound(VehicleId),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
