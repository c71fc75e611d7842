//! # Geo primitives
//!
//! Great-circle math on WGS84 degree coordinates: Haversine distance, initial
//! bearing, interpolation and straight-line stepping. Everything here is pure.
//!
//! Inputs are validated at the public entry points of the crate (see
//! [`Coordinate::validate`]); the functions below assume finite, in-range values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

/// Rejected coordinate, surfaced instead of letting NaN flow into results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({latitude}, {longitude}): {reason}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub reason: &'static str,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that both components are finite and inside their ranges.
    pub fn validate(&self) -> Result<Self, InvalidCoordinate> {
        let reason = if !self.latitude.is_finite() || !self.longitude.is_finite() {
            Some("not a finite number")
        } else if !(-90.0..=90.0).contains(&self.latitude) {
            Some("latitude outside [-90, 90]")
        } else if !(-180.0..=180.0).contains(&self.longitude) {
            Some("longitude outside [-180, 180]")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
                reason,
            }),
            None => Ok(*self),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Haversine great-circle distance in kilometres.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing from `a` towards `b`, in degrees clockwise from north, `[0, 360)`.
pub fn bearing_deg(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Eight-wind name for a bearing ("north", "southeast", ...).
pub fn compass_point(bearing: f64) -> &'static str {
    const POINTS: [&str; 8] = [
        "north",
        "northeast",
        "east",
        "southeast",
        "south",
        "southwest",
        "west",
        "northwest",
    ];
    let sector = ((bearing.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    POINTS[sector]
}

/// Point at `fraction` of the great-circle path from `a` to `b`.
pub fn intermediate_point(a: Coordinate, b: Coordinate, fraction: f64) -> Coordinate {
    let delta = distance_km(a, b) / EARTH_RADIUS_KM;
    if delta < 1e-12 {
        return a;
    }

    let (lat1, lng1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lng2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let wa = ((1.0 - fraction) * delta).sin() / delta.sin();
    let wb = (fraction * delta).sin() / delta.sin();

    let x = wa * lat1.cos() * lng1.cos() + wb * lat2.cos() * lng2.cos();
    let y = wa * lat1.cos() * lng1.sin() + wb * lat2.cos() * lng2.sin();
    let z = wa * lat1.sin() + wb * lat2.sin();

    Coordinate::new(
        z.atan2((x * x + y * y).sqrt()).to_degrees(),
        y.atan2(x).to_degrees(),
    )
}

/// Linear interpolation in degree space; used for synthetic road waypoints.
pub fn lerp(a: Coordinate, b: Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        a.latitude + (b.latitude - a.latitude) * fraction,
        a.longitude + (b.longitude - a.longitude) * fraction,
    )
}

/// Moves `step_km` from `from` towards `to` along the great circle.
/// Lands exactly on `to` when the step reaches or passes it.
pub fn step_toward(from: Coordinate, to: Coordinate, step_km: f64) -> Coordinate {
    let remaining = distance_km(from, to);
    if remaining <= step_km {
        return to;
    }
    intermediate_point(from, to, step_km / remaining)
}

/// Total length of a polyline.
pub fn path_length_km(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| distance_km(w[0], w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NAIROBI: Coordinate = Coordinate::new(-1.2921, 36.8219);
    const MOMBASA: Coordinate = Coordinate::new(-4.0435, 39.6682);

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-89.0f64..89.0, -179.0f64..179.0).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
            prop_assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        }

        #[test]
        fn distance_to_self_is_zero(a in coordinate()) {
            prop_assert_eq!(distance_km(a, a), 0.0);
        }

        #[test]
        fn step_shortens_remaining_by_step(a in coordinate(), b in coordinate()) {
            let remaining = distance_km(a, b);
            prop_assume!(remaining > 2.0 && remaining < 15_000.0);
            let next = step_toward(a, b, 1.0);
            prop_assert!((distance_km(next, b) - (remaining - 1.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_nairobi_to_mombasa() {
        let d = distance_km(NAIROBI, MOMBASA);
        assert!((418.0..=440.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_bearing_and_compass() {
        let east = bearing_deg(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((east - 90.0).abs() < 1e-9);
        assert_eq!(compass_point(east), "east");
        assert_eq!(compass_point(359.0), "north");
        assert_eq!(compass_point(-45.0), "northwest");
        assert_eq!(compass_point(bearing_deg(NAIROBI, MOMBASA)), "southeast");
    }

    #[test]
    fn test_step_snaps_to_target() {
        let target = Coordinate::new(-1.2925, 36.8219);
        assert_eq!(step_toward(NAIROBI, target, 1.0), target);
    }

    #[test]
    fn test_intermediate_midpoint_is_equidistant() {
        let mid = intermediate_point(NAIROBI, MOMBASA, 0.5);
        let diff = distance_km(NAIROBI, mid) - distance_km(mid, MOMBASA);
        assert!(diff.abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(Coordinate::new(f64::NAN, 1.0).validate().is_err());
        assert!(Coordinate::new(91.0, 1.0).validate().is_err());
        let err = Coordinate::new(1.0, -180.5).validate().unwrap_err();
        assert_eq!(err.reason, "longitude outside [-180, 180]");
        assert!(NAIROBI.validate().is_ok());
    }

    #[test]
    fn test_path_length_sums_legs() {
        let mid = intermediate_point(NAIROBI, MOMBASA, 0.25);
        let total = path_length_km(&[NAIROBI, mid, MOMBASA]);
        assert!((total - distance_km(NAIROBI, MOMBASA)).abs() < 1e-6);
        assert_eq!(path_length_km(&[NAIROBI]), 0.0);
    }
}
