//! Custom actions for the delivery actor.

use crate::geo::Coordinate;
use crate::model::DeliveryTracking;

#[derive(Debug, Clone)]
pub enum DeliveryAction {
    /// One simulation step: complete when inside the arrival radius, otherwise
    /// move `step_km` toward the destination.
    Advance {
        step_km: f64,
        arrival_radius_km: f64,
        /// Reported on the generated fix.
        speed_kmh: f64,
    },
    /// Mark delivered at `final_location`. Idempotent.
    Complete { final_location: Coordinate },
}

/// Results from [`DeliveryAction`]s; variants match 1:1.
#[derive(Debug, Clone)]
pub enum DeliveryActionResult {
    Advance(StepOutcome),
    Complete(Completion),
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Moved(DeliveryTracking),
    Arrived(Completion),
    /// Already completed; nothing changed.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub tracking: DeliveryTracking,
    /// False when the delivery had already been completed before this request.
    pub newly_completed: bool,
}
