//! Delivery tracking records.

use crate::geo::{self, Coordinate};
use crate::model::{DeliveryId, DriverId, Route, TrackingId, VehicleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    InProgress,
    Completed,
}

/// A position fix, as reported by a driver or produced by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    pub speed_kmh: Option<f64>,
    pub heading_deg: Option<f64>,
    pub accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    /// A bare position with no motion data.
    pub fn at(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            speed_kmh: None,
            heading_deg: None,
            accuracy_m: None,
            timestamp,
        }
    }
}

/// Inbound driver position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
}

impl LocationReport {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed: None,
            heading: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckpointKind {
    Departed,
    Milestone { percent: u8 },
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub coordinate: Coordinate,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: CheckpointKind,
}

/// Payload that opens a tracking session.
#[derive(Debug, Clone)]
pub struct StartTracking {
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
    pub route: Arc<Route>,
    pub started_at: DateTime<Utc>,
}

/// Live state of one delivery. Owned by the delivery actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTracking {
    pub tracking_id: TrackingId,
    pub delivery_id: DeliveryId,
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
    pub route: Arc<Route>,
    pub status: DeliveryStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub current_location: LocationFix,
    pub progress: u8,
    pub estimated_arrival: DateTime<Utc>,
    pub checkpoints: Vec<Checkpoint>,

    /// Highest milestone percentage already checkpointed.
    pub last_milestone: u8,
}

impl DeliveryTracking {
    pub fn is_completed(&self) -> bool {
        self.status == DeliveryStatus::Completed
    }

    pub fn origin(&self) -> Coordinate {
        self.route.origin
    }

    pub fn destination(&self) -> Coordinate {
        self.route.destination
    }

    /// Straight-line distance from origin to destination.
    pub fn total_km(&self) -> f64 {
        geo::distance_km(self.origin(), self.destination())
    }

    /// Straight-line distance from the current position to the destination.
    pub fn remaining_km(&self) -> f64 {
        geo::distance_km(self.current_location.coordinate, self.destination())
    }

    pub fn delivered_checkpoints(&self) -> usize {
        self.checkpoints
            .iter()
            .filter(|c| c.kind == CheckpointKind::Delivered)
            .count()
    }
}
