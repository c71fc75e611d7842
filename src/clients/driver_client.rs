//! # Driver Client

use crate::driver_actor::DriverError;
use crate::model::{DriverId, DriverLocation, LocationFix};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct DriverClient {
    inner: ResourceClient<DriverLocation>,
}

impl DriverClient {
    pub fn new(inner: ResourceClient<DriverLocation>) -> Self {
        Self { inner }
    }

    /// Replaces the driver's last known position.
    #[instrument(skip(self))]
    pub async fn report_location(&self, id: DriverId, fix: LocationFix) -> Result<DriverLocation, DriverError> {
        debug!("Sending request");
        self.inner.put(id, fix).await.map_err(Self::map_error)
    }

    pub async fn load(&self, items: Vec<DriverLocation>) -> Result<usize, DriverError> {
        let items = items.into_iter().map(|d| (d.driver_id.clone(), d)).collect();
        self.inner.load(items).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<DriverLocation> for DriverClient {
    type Error = DriverError;

    fn inner(&self) -> &ResourceClient<DriverLocation> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> DriverError {
        match e {
            FrameworkError::NotFound(id) => DriverError::NotFound(id.into()),
            other => other
                .into_entity_error::<DriverError>()
                .unwrap_or_else(|e| DriverError::ActorCommunicationError(e.to_string())),
        }
    }
}
