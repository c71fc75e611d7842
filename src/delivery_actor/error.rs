//! Error types for the delivery actor.

use crate::geo::InvalidCoordinate;
use crate::model::DeliveryId;
use thiserror::Error;

/// Errors that can occur during delivery tracking operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    /// The delivery is not being tracked.
    #[error("Delivery not found: {0}")]
    NotFound(DeliveryId),

    /// A tracking session already exists for this delivery id.
    #[error("Delivery already tracked: {0}")]
    AlreadyTracking(DeliveryId),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
