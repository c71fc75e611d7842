//! [`ActorEntity`] implementation for [`VehicleStatus`].

use super::error::VehicleError;
use super::VehicleContext;
use crate::events::TrackingEvent;
use crate::model::{VehicleId, VehicleReport, VehicleStatus};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use tracing::{debug, warn};

#[async_trait]
impl ActorEntity for VehicleStatus {
    type Id = VehicleId;
    type Create = VehicleReport;
    type Update = VehicleReport;
    type Action = ();
    type ActionResult = ();
    type Context = VehicleContext;
    type Error = VehicleError;

    fn from_create_params(vehicle_id: VehicleId, report: VehicleReport) -> Result<Self, VehicleError> {
        if let Some(location) = &report.telemetry.location {
            location.validate()?;
        }
        Ok(Self {
            vehicle_id,
            telemetry: report.telemetry,
            timestamp: report.reported_at,
        })
    }

    async fn on_create(&mut self, ctx: &VehicleContext) -> Result<(), VehicleError> {
        if !self.telemetry.maintenance_alerts.is_empty() {
            warn!(vehicle_id = %self.vehicle_id, alerts = ?self.telemetry.maintenance_alerts, "Maintenance alerts reported");
        }
        debug!(vehicle_id = %self.vehicle_id, fuel = ?self.telemetry.fuel_level, "Vehicle status updated");
        ctx.events.publish(&TrackingEvent::VehicleStatusUpdated(self.clone()));
        Ok(())
    }

    async fn on_update(&mut self, report: VehicleReport, ctx: &VehicleContext) -> Result<(), VehicleError> {
        *self = Self::from_create_params(self.vehicle_id.clone(), report)?;
        self.on_create(ctx).await
    }

    async fn handle_action(&mut self, _action: (), _ctx: &VehicleContext) -> Result<(), VehicleError> {
        Ok(())
    }
}
