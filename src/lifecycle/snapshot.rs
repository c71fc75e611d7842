//! Point-in-time copy of all tracking state, for callers that want to persist
//! it themselves.

use crate::model::{DeliveryTracking, DriverLocation, VehicleStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSnapshot {
    pub taken_at: DateTime<Utc>,
    pub deliveries: Vec<DeliveryTracking>,
    pub drivers: Vec<DriverLocation>,
    pub vehicles: Vec<VehicleStatus>,
}

impl TrackingSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
