//! Configuration schema.
//!
//! All types derive Serde traits and default every field, so partial TOML files
//! only need to mention what they override.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub tracking: TrackingConfig,
    pub routing: RoutingConfig,
    pub traffic: TrafficConfig,
    pub providers: ProvidersConfig,
    pub observability: ObservabilityConfig,
}

/// Live tracking and simulation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Period of the simulation tick.
    pub tick_interval_secs: u64,

    /// How long a completed delivery stays queryable.
    pub retention_secs: u64,

    /// Used for ETAs.
    pub average_speed_kmh: f64,

    /// Distance advanced per tick.
    pub step_km: f64,

    /// A delivery closer than this to its destination is completed on the next tick.
    pub arrival_radius_km: f64,

    /// When false, `start()` does not arm the tick timer.
    pub simulation_enabled: bool,

    /// Request queue bound for each actor.
    pub channel_capacity: usize,
}

impl TrackingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 30,
            retention_secs: 3600,
            average_speed_kmh: 50.0,
            step_km: 1.0,
            arrival_radius_km: 0.1,
            simulation_enabled: true,
            channel_capacity: 64,
        }
    }
}

/// Route computation and costing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub cache_ttl_secs: u64,
    pub average_speed_kmh: f64,

    /// Intermediate points synthesized when a request carries no waypoints.
    pub synthetic_waypoints: usize,

    /// Maximum per-axis deviation of a synthesized waypoint, in degrees.
    pub waypoint_jitter_deg: f64,

    /// Tolls apply only to routes strictly longer than this.
    pub toll_threshold_km: f64,
    pub toll_rate_per_km: f64,
    pub fuel_price_per_litre: f64,

    /// Chance that a traffic report carries a synthetic incident.
    pub incident_probability: f64,
}

impl RoutingConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            average_speed_kmh: 50.0,
            synthetic_waypoints: 3,
            waypoint_jitter_deg: 0.005,
            toll_threshold_km: 50.0,
            toll_rate_per_km: 2.0,
            fuel_price_per_litre: 180.0,
            incident_probability: 0.1,
        }
    }
}

/// Synthetic traffic model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Offset from UTC used to decide whether "now" is a peak hour.
    pub utc_offset_hours: i32,
    pub peak_windows: Vec<PeakWindow>,
    pub peak_penalty: f64,

    /// Amplitude of the uniform jitter added to every factor.
    pub jitter: f64,
    pub congestion_zones: Vec<CongestionZone>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 3,
            peak_windows: vec![
                PeakWindow {
                    start_hour: 7,
                    end_hour: 9,
                },
                PeakWindow {
                    start_hour: 17,
                    end_hour: 19,
                },
            ],
            peak_penalty: 0.3,
            jitter: 0.1,
            congestion_zones: vec![CongestionZone {
                name: "Nairobi CBD".to_string(),
                center: Coordinate::new(-1.2921, 36.8219),
                radius_km: 5.0,
                penalty: 0.2,
            }],
        }
    }
}

/// Local hours `[start_hour, end_hour]`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PeakWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl PeakWindow {
    pub fn contains(&self, hour: u32) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CongestionZone {
    pub name: String,
    pub center: Coordinate,
    pub radius_km: f64,
    pub penalty: f64,
}

/// Timeouts and retries for geocoding and weather lookups.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub timeout_ms: u64,

    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay before retry number `attempt` (0-based): base × 2^attempt, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor).min(self.backoff_max_ms))
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            max_retries: 2,
            backoff_base_ms: 100,
            backoff_max_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_window_is_inclusive() {
        let window = PeakWindow {
            start_hour: 7,
            end_hour: 9,
        };
        assert!(window.contains(7));
        assert!(window.contains(9));
        assert!(!window.contains(10));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let providers = ProvidersConfig::default();
        assert_eq!(providers.backoff(0), Duration::from_millis(100));
        assert_eq!(providers.backoff(1), Duration::from_millis(200));
        assert_eq!(providers.backoff(5), Duration::from_millis(1000));
        assert_eq!(providers.backoff(80), Duration::from_millis(1000));
    }
}
