//! Error types for the driver actor.

use crate::geo::InvalidCoordinate;
use crate::model::DriverId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DriverError {
    #[error("Driver not found: {0}")]
    NotFound(DriverId),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
