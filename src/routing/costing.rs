//! Route costing: travel-time multipliers, fuel, tolls and the synthetic
//! traffic factor. All functions are pure apart from the injected randomness.

use crate::config::{RoutingConfig, TrafficConfig};
use crate::env::RandomSource;
use crate::geo::{self, Coordinate};
use crate::model::VehicleClass;
use chrono::{DateTime, Duration, Timelike, Utc};

/// Travel-time multiplier relative to a car.
pub fn vehicle_time_multiplier(class: VehicleClass) -> f64 {
    match class {
        VehicleClass::Motorcycle => 0.8,
        VehicleClass::Car => 1.0,
        VehicleClass::Van => 1.1,
        VehicleClass::Truck => 1.3,
        VehicleClass::HeavyTruck => 1.6,
        VehicleClass::Other => 1.0,
    }
}

pub fn litres_per_km(class: VehicleClass) -> f64 {
    match class {
        VehicleClass::Motorcycle => 0.03,
        VehicleClass::Car => 0.08,
        VehicleClass::Van => 0.12,
        VehicleClass::Truck => 0.25,
        VehicleClass::HeavyTruck => 0.35,
        VehicleClass::Other => 0.10,
    }
}

pub fn fuel_cost(distance_km: f64, class: VehicleClass, price_per_litre: f64) -> f64 {
    round2(distance_km * litres_per_km(class) * price_per_litre)
}

/// Zero up to the threshold (inclusive) or when waived, flat per-km rate above it.
pub fn toll_cost(distance_km: f64, routing: &RoutingConfig, avoid_tolls: bool) -> f64 {
    if avoid_tolls || distance_km <= routing.toll_threshold_km {
        return 0.0;
    }
    round2(distance_km * routing.toll_rate_per_km)
}

/// Hour of day at the configured UTC offset.
pub fn local_hour(now: DateTime<Utc>, utc_offset_hours: i32) -> u32 {
    (now + Duration::hours(i64::from(utc_offset_hours))).hour()
}

/// Synthetic congestion multiplier, never below 1.0.
///
/// Adds the peak penalty inside a peak window, the largest penalty among the
/// congestion zones touching either endpoint, and a uniform jitter.
pub fn traffic_factor(
    origin: Coordinate,
    destination: Coordinate,
    now: DateTime<Utc>,
    traffic: &TrafficConfig,
    random: &dyn RandomSource,
) -> f64 {
    let mut factor = 1.0;

    let hour = local_hour(now, traffic.utc_offset_hours);
    if traffic.peak_windows.iter().any(|w| w.contains(hour)) {
        factor += traffic.peak_penalty;
    }

    let zone_penalty = traffic
        .congestion_zones
        .iter()
        .filter(|zone| {
            geo::distance_km(origin, zone.center) <= zone.radius_km
                || geo::distance_km(destination, zone.center) <= zone.radius_km
        })
        .map(|zone| zone.penalty)
        .fold(0.0, f64::max);
    factor += zone_penalty;

    factor += random.symmetric(traffic.jitter);
    factor.max(1.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedRandom;
    use chrono::TimeZone;

    const NAIROBI: Coordinate = Coordinate::new(-1.2921, 36.8219);
    const MOMBASA: Coordinate = Coordinate::new(-4.0435, 39.6682);
    const NAKURU: Coordinate = Coordinate::new(-0.3031, 36.0800);

    fn at_utc(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, 15, 0).unwrap()
    }

    #[test]
    fn test_off_peak_outside_zones_is_free_flow() {
        let factor = traffic_factor(MOMBASA, NAKURU, at_utc(10), &TrafficConfig::default(), &FixedRandom::midpoint());
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_peak_and_zone_penalties_add_up() {
        // 05:15 UTC is 08:15 local, inside the morning window.
        let factor = traffic_factor(NAIROBI, MOMBASA, at_utc(5), &TrafficConfig::default(), &FixedRandom::midpoint());
        assert!((factor - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zone_penalty_counted_once_when_both_ends_inside() {
        let nearby = Coordinate::new(-1.2864, 36.8172);
        let factor = traffic_factor(NAIROBI, nearby, at_utc(10), &TrafficConfig::default(), &FixedRandom::midpoint());
        assert!((factor - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_factor_floored_at_one() {
        let factor = traffic_factor(MOMBASA, NAKURU, at_utc(10), &TrafficConfig::default(), &FixedRandom::new(0.0));
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_tolls_only_above_threshold_and_waivable() {
        let routing = RoutingConfig::default();
        assert_eq!(toll_cost(50.0, &routing, false), 0.0);
        assert_eq!(toll_cost(120.0, &routing, false), 240.0);
        assert_eq!(toll_cost(120.0, &routing, true), 0.0);
    }

    #[test]
    fn test_fuel_cost_by_class() {
        assert_eq!(fuel_cost(100.0, VehicleClass::Car, 180.0), 1440.0);
        assert_eq!(fuel_cost(100.0, VehicleClass::HeavyTruck, 180.0), 6300.0);
        assert!(vehicle_time_multiplier(VehicleClass::Motorcycle) < vehicle_time_multiplier(VehicleClass::Truck));
    }
}
