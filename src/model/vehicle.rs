//! Vehicle telemetry. Last write wins.

use crate::geo::Coordinate;
use crate::model::{DriverId, VehicleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound telemetry payload; every reading is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTelemetry {
    pub fuel_level: Option<f64>,
    pub engine_temp: Option<f64>,
    pub battery_level: Option<f64>,
    pub mileage: Option<f64>,
    pub maintenance_alerts: Vec<String>,
    pub location: Option<Coordinate>,
}

/// Telemetry stamped with its arrival time; the vehicle store's create payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleReport {
    pub telemetry: VehicleTelemetry,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub vehicle_id: VehicleId,
    #[serde(flatten)]
    pub telemetry: VehicleTelemetry,
    pub timestamp: DateTime<Utc>,
}

/// A driver-raised emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub driver_id: DriverId,
    pub kind: String,
    pub location: Coordinate,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}
