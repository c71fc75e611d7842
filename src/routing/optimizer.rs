use crate::config::{DispatchConfig, ProvidersConfig, RoutingConfig, TrafficConfig};
use crate::env::{SharedClock, SharedRandom};
use crate::geo::{self, Coordinate};
use crate::model::{
    HasLocation, Incident, IncidentKind, IncidentSeverity, OrderedStop, Route, RouteId, RouteOptions,
    TrafficConditions, TrafficLevel, TrafficReport,
};
use crate::routing::cache::{CacheLookup, RouteCache};
use crate::routing::costing::{self, round2};
use crate::routing::providers::{call_with_retries, Geocoder, SyntheticGeocoder, SyntheticWeather, WeatherProvider};
use crate::routing::RoutingError;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Computes, caches and orders routes.
///
/// Cached routes are returned unchanged for the whole TTL, including their
/// traffic descriptor. Use [`RouteOptimizer::get_traffic_data`] for a fresh
/// reading.
pub struct RouteOptimizer {
    routing: RoutingConfig,
    traffic: TrafficConfig,
    providers: ProvidersConfig,
    cache: RouteCache,
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
    clock: SharedClock,
    random: SharedRandom,
}

impl RouteOptimizer {
    /// An optimizer backed by the offline geocoder and weather source.
    pub fn new(config: &DispatchConfig, clock: SharedClock, random: SharedRandom) -> Self {
        Self {
            routing: config.routing.clone(),
            traffic: config.traffic.clone(),
            providers: config.providers.clone(),
            cache: RouteCache::new(config.routing.cache_ttl(), clock.clone()),
            geocoder: Arc::new(SyntheticGeocoder),
            weather: Arc::new(SyntheticWeather::new(random.clone())),
            clock,
            random,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = weather;
        self
    }

    /// Returns the cached route for this request if it is younger than the
    /// TTL, otherwise computes and caches a new one.
    #[instrument(skip(self, options))]
    pub async fn get_optimized_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: &RouteOptions,
    ) -> Result<Arc<Route>, RoutingError> {
        validate_request(origin, destination, options)?;
        let key = serde_json::to_string(&(origin, destination, options))?;

        match self.cache.lookup(&key) {
            CacheLookup::Hit(route) => {
                debug!(route_id = %route.id, "Cache hit");
                return Ok(route);
            }
            CacheLookup::Stale => debug!("Cached route expired, recomputing"),
            CacheLookup::Miss => debug!("Cache miss"),
        }

        let route = Arc::new(self.calculate_route(origin, destination, options).await?);
        self.cache.insert(key, route.clone());
        Ok(route)
    }

    /// Assembles a fresh route without consulting the cache.
    pub async fn calculate_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: &RouteOptions,
    ) -> Result<Route, RoutingError> {
        validate_request(origin, destination, options)?;

        let (origin_address, destination_address, weather) = tokio::join!(
            self.reverse_geocode(origin),
            self.reverse_geocode(destination),
            call_with_retries("weather", &self.providers, || self.weather.current_weather(origin)),
        );

        let waypoints = if options.waypoints.is_empty() {
            self.synthesize_waypoints(origin, destination)
        } else {
            options.waypoints.clone()
        };

        let mut path = Vec::with_capacity(waypoints.len() + 2);
        path.push(origin);
        path.extend(waypoints.iter().copied());
        path.push(destination);

        let distance_km = round2(geo::path_length_km(&path));
        let base_minutes = distance_km / self.routing.average_speed_kmh * 60.0;
        let factor = costing::traffic_factor(origin, destination, self.clock.now(), &self.traffic, self.random.as_ref());
        let duration_minutes =
            (base_minutes * factor * costing::vehicle_time_multiplier(options.vehicle_class)).round() as u32;
        let delay_minutes = (f64::from(duration_minutes) - base_minutes).max(0.0).round() as u32;

        let instructions = build_instructions(&path, origin_address.as_deref(), destination_address.as_deref());

        let route = Route {
            id: RouteId::generate(),
            origin,
            origin_address,
            destination,
            destination_address,
            waypoints,
            distance_km,
            duration_minutes,
            fuel_cost: costing::fuel_cost(distance_km, options.vehicle_class, self.routing.fuel_price_per_litre),
            toll_cost: costing::toll_cost(distance_km, &self.routing, options.avoid_tolls),
            traffic: TrafficConditions {
                factor: round2(factor),
                level: TrafficLevel::from_factor(factor),
                delay_minutes,
            },
            weather,
            instructions,
            vehicle_class: options.vehicle_class,
            created_at: self.clock.now(),
        };
        info!(route_id = %route.id, distance_km, duration_minutes, "Route computed");
        Ok(route)
    }

    /// Orders `stops` by repeatedly visiting the nearest unvisited one.
    pub fn optimize_multiple_deliveries<T: HasLocation>(
        &self,
        stops: Vec<T>,
        start: Coordinate,
    ) -> Result<Vec<OrderedStop<T>>, RoutingError> {
        start.validate()?;
        for stop in &stops {
            stop.location().validate()?;
        }
        Ok(nearest_neighbor_order(stops, start))
    }

    /// A fresh traffic reading for `route`, possibly with one synthetic incident.
    pub fn get_traffic_data(&self, route: &Route) -> TrafficReport {
        let factor =
            costing::traffic_factor(route.origin, route.destination, self.clock.now(), &self.traffic, self.random.as_ref());
        let base_minutes = route.distance_km / self.routing.average_speed_kmh * 60.0;
        let delay_minutes = (base_minutes * (factor - 1.0)).round() as u32;

        let mut incidents = Vec::new();
        if !route.waypoints.is_empty() && self.random.unit() < self.routing.incident_probability {
            incidents.push(Incident {
                kind: IncidentKind::ALL[self.random.index(IncidentKind::ALL.len())],
                severity: IncidentSeverity::ALL[self.random.index(IncidentSeverity::ALL.len())],
                location: route.waypoints[self.random.index(route.waypoints.len())],
                duration_minutes: self.random.between(15, 120),
            });
        }

        TrafficReport {
            factor: round2(factor),
            level: TrafficLevel::from_factor(factor),
            delay_minutes,
            incidents,
        }
    }

    /// Drops expired cache entries; returns how many.
    pub fn sweep_cache(&self) -> usize {
        let evicted = self.cache.sweep();
        if evicted > 0 {
            info!(evicted, remaining = self.cache.len(), "Route cache swept");
        }
        evicted
    }

    pub fn cached_routes(&self) -> usize {
        self.cache.len()
    }

    async fn reverse_geocode(&self, at: Coordinate) -> Option<String> {
        call_with_retries("reverse_geocode", &self.providers, || self.geocoder.reverse_geocode(at)).await
    }

    /// Evenly spaced points between the endpoints, nudged to mimic a road.
    fn synthesize_waypoints(&self, origin: Coordinate, destination: Coordinate) -> Vec<Coordinate> {
        let n = self.routing.synthetic_waypoints;
        let jitter = self.routing.waypoint_jitter_deg;
        (1..=n)
            .map(|i| {
                let p = geo::lerp(origin, destination, i as f64 / (n + 1) as f64);
                Coordinate::new(
                    (p.latitude + self.random.symmetric(jitter)).clamp(-90.0, 90.0),
                    (p.longitude + self.random.symmetric(jitter)).clamp(-180.0, 180.0),
                )
            })
            .collect()
    }
}

fn validate_request(origin: Coordinate, destination: Coordinate, options: &RouteOptions) -> Result<(), RoutingError> {
    origin.validate()?;
    destination.validate()?;
    for waypoint in &options.waypoints {
        waypoint.validate()?;
    }
    Ok(())
}

fn build_instructions(path: &[Coordinate], origin: Option<&str>, destination: Option<&str>) -> Vec<String> {
    let origin_label = origin.map_or_else(|| path[0].to_string(), str::to_string);
    let last = path[path.len() - 1];
    let destination_label = destination.map_or_else(|| last.to_string(), str::to_string);

    let mut instructions = Vec::with_capacity(path.len() + 1);
    instructions.push(format!(
        "Head {} from {}",
        geo::compass_point(geo::bearing_deg(path[0], path[1])),
        origin_label
    ));
    for leg in path.windows(2) {
        instructions.push(format!(
            "Continue {} for {:.1} km",
            geo::compass_point(geo::bearing_deg(leg[0], leg[1])),
            geo::distance_km(leg[0], leg[1])
        ));
    }
    instructions.push(format!("Arrive at {destination_label}"));
    instructions
}

/// Greedy open-path ordering from `start`. O(n²); ties go to the earlier stop.
pub fn nearest_neighbor_order<T: HasLocation>(stops: Vec<T>, start: Coordinate) -> Vec<OrderedStop<T>> {
    let mut remaining: Vec<Option<T>> = stops.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut current = start;

    loop {
        let mut best: Option<(usize, f64)> = None;
        for (i, stop) in remaining.iter().enumerate() {
            let Some(stop) = stop else { continue };
            let d = geo::distance_km(current, stop.location());
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }
        let Some((next, distance)) = best else { break };
        let Some(stop) = remaining[next].take() else { break };
        current = stop.location();
        ordered.push(OrderedStop {
            stop,
            distance_from_previous_km: round2(distance),
        });
    }
    ordered
}
