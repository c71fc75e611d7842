//! # Vehicle Client

use crate::model::{VehicleId, VehicleReport, VehicleStatus};
use crate::vehicle_actor::VehicleError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct VehicleClient {
    inner: ResourceClient<VehicleStatus>,
}

impl VehicleClient {
    pub fn new(inner: ResourceClient<VehicleStatus>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, report))]
    pub async fn report_status(&self, id: VehicleId, report: VehicleReport) -> Result<VehicleStatus, VehicleError> {
        debug!(?report, "Sending request");
        self.inner.put(id, report).await.map_err(Self::map_error)
    }

    pub async fn load(&self, items: Vec<VehicleStatus>) -> Result<usize, VehicleError> {
        let items = items.into_iter().map(|v| (v.vehicle_id.clone(), v)).collect();
        self.inner.load(items).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<VehicleStatus> for VehicleClient {
    type Error = VehicleError;

    fn inner(&self) -> &ResourceClient<VehicleStatus> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> VehicleError {
        match e {
            FrameworkError::NotFound(id) => VehicleError::NotFound(id.into()),
            other => other
                .into_entity_error::<VehicleError>()
                .unwrap_or_else(|e| VehicleError::ActorCommunicationError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VehicleTelemetry;
    use actor_framework::mock::MockClient;
    use chrono::Utc;

    #[tokio::test]
    async fn test_report_status_returns_stored_snapshot() {
        let now = Utc::now();
        let telemetry = VehicleTelemetry {
            fuel_level: Some(0.42),
            maintenance_alerts: vec!["tyre_pressure".into()],
            ..Default::default()
        };
        let stored = VehicleStatus {
            vehicle_id: "veh1".into(),
            telemetry: telemetry.clone(),
            timestamp: now,
        };

        let mut mock = MockClient::<VehicleStatus>::new();
        mock.expect_put("veh1".into()).return_ok(stored.clone());
        mock.expect_list().return_ok(vec![stored.clone()]);

        let vehicles = VehicleClient::new(mock.client());
        let report = VehicleReport {
            telemetry,
            reported_at: now,
        };
        assert_eq!(vehicles.report_status("veh1".into(), report).await.unwrap(), stored);
        assert_eq!(vehicles.list().await.unwrap(), vec![stored]);
        mock.verify();
    }
}
