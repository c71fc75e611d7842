//! # Delivery Client
//!
//! High-level API over the delivery actor.

use crate::delivery_actor::{Completion, DeliveryAction, DeliveryActionResult, DeliveryError, StepOutcome};
use crate::geo::Coordinate;
use crate::model::{DeliveryId, DeliveryTracking, LocationFix, StartTracking};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct DeliveryClient {
    inner: ResourceClient<DeliveryTracking>,
}

impl DeliveryClient {
    pub fn new(inner: ResourceClient<DeliveryTracking>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<DeliveryTracking> for DeliveryClient {
    type Error = DeliveryError;

    fn inner(&self) -> &ResourceClient<DeliveryTracking> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> DeliveryError {
        match e {
            FrameworkError::NotFound(id) => DeliveryError::NotFound(id.into()),
            FrameworkError::AlreadyExists(id) => DeliveryError::AlreadyTracking(id.into()),
            other => other
                .into_entity_error::<DeliveryError>()
                .unwrap_or_else(|e| DeliveryError::ActorCommunicationError(e.to_string())),
        }
    }
}

impl DeliveryClient {
    #[instrument(skip(self, params), fields(driver_id = %params.driver_id))]
    pub async fn start_tracking(&self, id: DeliveryId, params: StartTracking) -> Result<DeliveryTracking, DeliveryError> {
        debug!("Sending request");
        self.inner.create(id, params).await.map_err(Self::map_error)
    }

    /// Applies a position fix; a completed delivery comes back unchanged.
    #[instrument(skip(self))]
    pub async fn apply_location(&self, id: DeliveryId, fix: LocationFix) -> Result<DeliveryTracking, DeliveryError> {
        debug!("Sending request");
        self.inner.update(id, fix).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        id: DeliveryId,
        step_km: f64,
        arrival_radius_km: f64,
        speed_kmh: f64,
    ) -> Result<StepOutcome, DeliveryError> {
        let action = DeliveryAction::Advance {
            step_km,
            arrival_radius_km,
            speed_kmh,
        };
        match self.inner.perform_action(id, action).await {
            Ok(DeliveryActionResult::Advance(outcome)) => Ok(outcome),
            Ok(other) => Err(unexpected(&other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: DeliveryId, final_location: Coordinate) -> Result<Completion, DeliveryError> {
        match self
            .inner
            .perform_action(id, DeliveryAction::Complete { final_location })
            .await
        {
            Ok(DeliveryActionResult::Complete(completion)) => Ok(completion),
            Ok(other) => Err(unexpected(&other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: DeliveryId) -> Result<(), DeliveryError> {
        self.inner.delete(id).await.map_err(Self::map_error)
    }

    /// Bulk insert without hooks or events.
    pub async fn load(&self, items: Vec<DeliveryTracking>) -> Result<usize, DeliveryError> {
        let items = items.into_iter().map(|t| (t.delivery_id.clone(), t)).collect();
        self.inner.load(items).await.map_err(Self::map_error)
    }
}

fn unexpected(result: &DeliveryActionResult) -> DeliveryError {
    DeliveryError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}
