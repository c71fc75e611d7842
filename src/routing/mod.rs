//! # Route optimizer
//!
//! Point-to-point route assembly with synthetic traffic and weather, a TTL route
//! cache, nearest-neighbour stop ordering, and traffic reports.
//!
//! - [`costing`] - multipliers, fuel, tolls, traffic factor
//! - [`cache`] - lazily expiring route cache
//! - [`providers`] - geocoding and weather lookups with timeout and retries
//! - [`optimizer`] - [`RouteOptimizer`] tying it together

pub mod cache;
pub mod costing;
pub mod error;
pub mod optimizer;
pub mod providers;

pub use cache::{CacheLookup, RouteCache};
pub use error::*;
pub use optimizer::{nearest_neighbor_order, RouteOptimizer};
pub use providers::{Geocoder, SyntheticGeocoder, SyntheticWeather, WeatherProvider};
