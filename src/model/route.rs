//! Routes, route options and traffic descriptors.

use crate::geo::Coordinate;
use crate::model::RouteId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle category; drives travel-time multipliers and fuel consumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Motorcycle,
    #[default]
    Car,
    Van,
    Truck,
    HeavyTruck,
    Other,
}

impl VehicleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Motorcycle => "motorcycle",
            VehicleClass::Car => "car",
            VehicleClass::Van => "van",
            VehicleClass::Truck => "truck",
            VehicleClass::HeavyTruck => "heavy_truck",
            VehicleClass::Other => "other",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied knobs for a route request. Part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    pub vehicle_class: VehicleClass,
    pub avoid_tolls: bool,

    /// Explicit via points; when empty, waypoints are synthesized.
    pub waypoints: Vec<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLevel {
    Light,
    Moderate,
    Heavy,
    Severe,
}

impl TrafficLevel {
    /// `<1.1` light, `<1.3` moderate, `<1.5` heavy, otherwise severe.
    pub fn from_factor(factor: f64) -> Self {
        if factor < 1.1 {
            TrafficLevel::Light
        } else if factor < 1.3 {
            TrafficLevel::Moderate
        } else if factor < 1.5 {
            TrafficLevel::Heavy
        } else {
            TrafficLevel::Severe
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficConditions {
    pub factor: f64,
    pub level: TrafficLevel,
    pub delay_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub condition: String,
    pub temperature_c: f64,
    pub wind_kmh: f64,
    pub visibility_km: f64,
}

/// A computed route. Immutable; the cache shares it as `Arc<Route>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub origin: Coordinate,
    pub origin_address: Option<String>,
    pub destination: Coordinate,
    pub destination_address: Option<String>,
    pub waypoints: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub fuel_cost: f64,
    pub toll_cost: f64,
    pub traffic: TrafficConditions,
    pub weather: Option<WeatherConditions>,
    pub instructions: Vec<String>,
    pub vehicle_class: VehicleClass,
    pub created_at: DateTime<Utc>,
}

impl Route {
    /// Origin, waypoints and destination in travel order.
    pub fn path(&self) -> Vec<Coordinate> {
        let mut points = Vec::with_capacity(self.waypoints.len() + 2);
        points.push(self.origin);
        points.extend(self.waypoints.iter().copied());
        points.push(self.destination);
        points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Accident,
    RoadWorks,
    Breakdown,
    Flooding,
}

impl IncidentKind {
    pub const ALL: [IncidentKind; 4] = [
        IncidentKind::Accident,
        IncidentKind::RoadWorks,
        IncidentKind::Breakdown,
        IncidentKind::Flooding,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
}

impl IncidentSeverity {
    pub const ALL: [IncidentSeverity; 3] = [
        IncidentSeverity::Low,
        IncidentSeverity::Medium,
        IncidentSeverity::High,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub kind: IncidentKind,
    pub severity: IncidentSeverity,
    pub location: Coordinate,
    pub duration_minutes: u32,
}

/// A fresh traffic reading for an existing route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReport {
    pub factor: f64,
    pub level: TrafficLevel,
    pub delay_minutes: u32,
    pub incidents: Vec<Incident>,
}

/// Anything that can be visited by the multi-stop optimizer.
pub trait HasLocation {
    fn location(&self) -> Coordinate;
}

/// A delivery drop-off to be ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStop {
    pub delivery_id: crate::model::DeliveryId,
    pub location: Coordinate,
}

impl HasLocation for DeliveryStop {
    fn location(&self) -> Coordinate {
        self.location
    }
}

impl HasLocation for Coordinate {
    fn location(&self) -> Coordinate {
        *self
    }
}

/// One stop of an optimized visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedStop<T> {
    pub stop: T,
    pub distance_from_previous_km: f64,
}
