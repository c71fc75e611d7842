//! Error types for route computation.

use crate::geo::InvalidCoordinate;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// Route options could not be turned into a cache key.
    #[error("cache key encoding failed: {0}")]
    CacheKey(#[from] serde_json::Error),
}

/// Failure of an external lookup (reverse geocoding, weather).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}
