//! [`ActorEntity`] implementation for [`DriverLocation`].

use super::error::DriverError;
use super::DriverContext;
use crate::events::TrackingEvent;
use crate::model::{DriverId, DriverLocation, LocationFix};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
impl ActorEntity for DriverLocation {
    type Id = DriverId;
    type Create = LocationFix;
    type Update = LocationFix;
    type Action = ();
    type ActionResult = ();
    type Context = DriverContext;
    type Error = DriverError;

    fn from_create_params(driver_id: DriverId, location: LocationFix) -> Result<Self, DriverError> {
        location.coordinate.validate()?;
        Ok(Self { driver_id, location })
    }

    async fn on_create(&mut self, ctx: &DriverContext) -> Result<(), DriverError> {
        debug!(driver_id = %self.driver_id, at = %self.location.coordinate, "Driver located");
        ctx.events.publish(&TrackingEvent::LocationUpdated(self.clone()));
        Ok(())
    }

    async fn on_update(&mut self, location: LocationFix, ctx: &DriverContext) -> Result<(), DriverError> {
        location.coordinate.validate()?;
        self.location = location;
        self.on_create(ctx).await
    }

    async fn handle_action(&mut self, _action: (), _ctx: &DriverContext) -> Result<(), DriverError> {
        Ok(())
    }
}
