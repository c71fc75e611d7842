use crate::clients::{ActorClient, DeliveryClient, DriverClient, VehicleClient};
use crate::config::{validate_config, ConfigError, DispatchConfig, TrackingConfig};
use crate::delivery_actor::{self, DeliveryContext, DeliveryError, StepOutcome};
use crate::driver_actor::{self, DriverContext, DriverError};
use crate::env::{SharedClock, SharedRandom, SystemClock, ThreadRandom};
use crate::events::{EventBus, EventKind, SubscriberError, Subscription, TrackingEvent};
use crate::geo::{Coordinate, InvalidCoordinate};
use crate::lifecycle::retention::RetentionScheduler;
use crate::lifecycle::snapshot::TrackingSnapshot;
use crate::lifecycle::TrackingError;
use crate::model::{
    DeliveryId, DeliveryStop, DeliveryTracking, DriverId, DriverLocation, EmergencyAlert, LocationFix, LocationReport,
    OrderedStop, Route, RouteOptions, StartTracking, TrafficReport, VehicleId, VehicleReport, VehicleStatus,
    VehicleTelemetry,
};
use crate::routing::{RouteOptimizer, RoutingError};
use crate::vehicle_actor::{self, VehicleContext, VehicleError};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// What one simulation tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub advanced: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackingStats {
    pub live_deliveries: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub drivers: usize,
    pub vehicles: usize,
    pub cached_routes: usize,
    pub subscribers: usize,
    pub pending_removals: usize,
}

/// The parts the periodic ticker needs; cloned into its task.
#[derive(Clone)]
struct Simulation {
    deliveries: DeliveryClient,
    retention: RetentionScheduler,
    settings: TrackingConfig,
}

impl Simulation {
    async fn tick(&self) -> Result<TickSummary, DeliveryError> {
        let speed_kmh = self.settings.step_km * 3600.0 / self.settings.tick_interval().as_secs_f64();
        let mut summary = TickSummary::default();

        for tracking in self.deliveries.list().await? {
            if tracking.is_completed() {
                continue;
            }
            let id = tracking.delivery_id;
            let outcome = self
                .deliveries
                .advance(id.clone(), self.settings.step_km, self.settings.arrival_radius_km, speed_kmh)
                .await;
            match outcome {
                Ok(StepOutcome::Moved(_)) => summary.advanced += 1,
                Ok(StepOutcome::Arrived(completion)) => {
                    if completion.newly_completed {
                        self.retention.schedule(id, self.settings.retention());
                        summary.completed += 1;
                    }
                }
                Ok(StepOutcome::Idle) => {}
                Err(DeliveryError::NotFound(_)) => debug!(delivery_id = %id, "Removed during tick"),
                Err(e) => warn!(delivery_id = %id, error = %e, "Tick step failed"),
            }
        }

        debug!(advanced = summary.advanced, completed = summary.completed, "Tick");
        Ok(summary)
    }
}

/// Orchestrates the tracking core.
///
/// Owns three resource actors (deliveries, driver positions, vehicle
/// telemetry), the route optimizer, the event bus, the simulation ticker and
/// the retention timers. Every inbound command of the dispatch core is a
/// method here.
///
/// Must be created inside a Tokio runtime: the actors are spawned immediately.
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use fleet_dispatch::config::DispatchConfig;
/// use fleet_dispatch::geo::Coordinate;
/// use fleet_dispatch::lifecycle::TrackingSystem;
/// use fleet_dispatch::model::RouteOptions;
///
/// let system = TrackingSystem::new(DispatchConfig::default())?;
/// let route = system
///     .compute_route(Coordinate::new(-1.2921, 36.8219), Coordinate::new(-1.2676, 36.8108), &RouteOptions::default())
///     .await?;
/// system.start_tracking("D1".into(), "drv1".into(), "veh1".into(), route).await?;
/// system.start().await?;
/// // ...
/// system.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct TrackingSystem {
    config: DispatchConfig,
    deliveries: DeliveryClient,
    drivers: DriverClient,
    vehicles: VehicleClient,
    optimizer: RouteOptimizer,
    events: EventBus,
    clock: SharedClock,
    simulation: Simulation,
    running: AtomicBool,
    ticker: Mutex<Option<JoinHandle<()>>>,
    handles: Vec<JoinHandle<()>>,
}

impl TrackingSystem {
    /// A system on the real clock and thread-local randomness.
    pub fn new(config: DispatchConfig) -> Result<Self, ConfigError> {
        Self::with_env(config, Arc::new(SystemClock), Arc::new(ThreadRandom))
    }

    /// A system with injected time and randomness.
    pub fn with_env(config: DispatchConfig, clock: SharedClock, random: SharedRandom) -> Result<Self, ConfigError> {
        let optimizer = RouteOptimizer::new(&config, clock.clone(), random);
        Self::with_optimizer(config, clock, optimizer)
    }

    /// A system around a preconfigured optimizer (custom geocoder or weather).
    ///
    /// Rejects a configuration that fails [`validate_config`]; nothing is
    /// spawned in that case.
    pub fn with_optimizer(
        config: DispatchConfig,
        clock: SharedClock,
        optimizer: RouteOptimizer,
    ) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let events = EventBus::new();
        let capacity = config.tracking.channel_capacity;

        // 1. Create actors
        let (delivery_actor, delivery_client) = delivery_actor::new(capacity);
        let (driver_actor, driver_client) = driver_actor::new(capacity);
        let (vehicle_actor, vehicle_client) = vehicle_actor::new(capacity);

        // 2. Start them with their contexts
        let handles = vec![
            tokio::spawn(delivery_actor.run(DeliveryContext {
                events: events.clone(),
                clock: clock.clone(),
                average_speed_kmh: config.tracking.average_speed_kmh,
            })),
            tokio::spawn(driver_actor.run(DriverContext { events: events.clone() })),
            tokio::spawn(vehicle_actor.run(VehicleContext { events: events.clone() })),
        ];

        let deliveries = DeliveryClient::new(delivery_client);
        let simulation = Simulation {
            deliveries: deliveries.clone(),
            retention: RetentionScheduler::new(deliveries.clone()),
            settings: config.tracking.clone(),
        };

        info!("Tracking system created");
        Ok(Self {
            config,
            deliveries,
            drivers: DriverClient::new(driver_client),
            vehicles: VehicleClient::new(vehicle_client),
            optimizer,
            events,
            clock,
            simulation,
            running: AtomicBool::new(false),
            ticker: Mutex::new(None),
            handles,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn optimizer(&self) -> &RouteOptimizer {
        &self.optimizer
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&TrackingEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.events.subscribe(kind, callback)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Arms the periodic tick (when simulation is enabled) and re-arms
    /// retention for completed records. Calling it while running does nothing.
    pub async fn start(&self) -> Result<(), TrackingError> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Already running");
            return Ok(());
        }

        self.rearm_retention(self.deliveries.list().await?);

        if self.config.tracking.simulation_enabled {
            let period = self.config.tracking.tick_interval().max(Duration::from_millis(1));
            let simulation = self.simulation.clone();
            let handle = tokio::spawn(async move {
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    if let Err(e) = simulation.tick().await {
                        warn!(error = %e, "Tick failed");
                    }
                }
            });
            *self.ticker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        }

        info!(
            tick_interval_secs = self.config.tracking.tick_interval_secs,
            simulation = self.config.tracking.simulation_enabled,
            "Tracking started"
        );
        Ok(())
    }

    /// Disarms the tick and cancels pending retention timers.
    pub fn stop(&self) {
        self.halt();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops everything, closes the actors and waits for them to finish.
    pub async fn shutdown(self) {
        let pending = self.halt();
        for handle in pending {
            let _ = handle.await;
        }

        let Self {
            deliveries,
            drivers,
            vehicles,
            simulation,
            handles,
            ..
        } = self;
        drop(simulation);
        drop(deliveries);
        drop(drivers);
        drop(vehicles);

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Actor task failed");
            }
        }
        info!("Tracking system shut down");
    }

    /// Aborts the ticker and retention timers, returning their handles.
    fn halt(&self) -> Vec<JoinHandle<()>> {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        let mut pending = self.simulation.retention.cancel_all();
        if let Some(ticker) = self.ticker.lock().unwrap_or_else(|e| e.into_inner()).take() {
            ticker.abort();
            pending.push(ticker);
        }
        if was_running {
            info!("Tracking stopped");
        }
        pending
    }

    fn rearm_retention(&self, records: Vec<DeliveryTracking>) {
        let retention = self.config.tracking.retention();
        let now = self.clock.now();
        for tracking in records {
            let Some(completed_at) = tracking.completed_at else {
                continue;
            };
            let elapsed = (now - completed_at).to_std().unwrap_or(Duration::ZERO);
            let remaining = retention.saturating_sub(elapsed);
            self.simulation.retention.schedule_if_absent(tracking.delivery_id, remaining);
        }
    }

    // =========================================================================
    // Inbound commands
    // =========================================================================

    /// Opens tracking for `delivery_id` at the route origin.
    #[instrument(skip(self, route), fields(route_id = %route.id))]
    pub async fn start_tracking(
        &self,
        delivery_id: DeliveryId,
        driver_id: DriverId,
        vehicle_id: VehicleId,
        route: Arc<Route>,
    ) -> Result<DeliveryTracking, DeliveryError> {
        let params = StartTracking {
            driver_id,
            vehicle_id,
            route,
            started_at: self.clock.now(),
        };
        self.deliveries.start_tracking(delivery_id, params).await
    }

    /// Records the driver's position and forwards it to every in-progress
    /// delivery assigned to that driver.
    #[instrument(skip(self))]
    pub async fn report_driver_location(
        &self,
        driver_id: DriverId,
        report: LocationReport,
        accuracy_m: Option<f64>,
    ) -> Result<DriverLocation, TrackingError> {
        let coordinate = report.coordinate().validate()?;
        let fix = LocationFix {
            coordinate,
            speed_kmh: report.speed,
            heading_deg: report.heading,
            accuracy_m,
            timestamp: self.clock.now(),
        };
        let location = self.drivers.report_location(driver_id.clone(), fix).await?;

        let assigned = self
            .deliveries
            .list()
            .await?
            .into_iter()
            .filter(|t| t.driver_id == driver_id && !t.is_completed());
        for tracking in assigned {
            match self.deliveries.apply_location(tracking.delivery_id.clone(), fix).await {
                Ok(_) | Err(DeliveryError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(location)
    }

    /// Applies a position to one delivery. Completed deliveries are returned
    /// unchanged and nothing is published.
    #[instrument(skip(self))]
    pub async fn report_delivery_status(
        &self,
        delivery_id: DeliveryId,
        location: Coordinate,
    ) -> Result<DeliveryTracking, DeliveryError> {
        location.validate()?;
        let fix = LocationFix::at(location, self.clock.now());
        self.deliveries.apply_location(delivery_id, fix).await
    }

    /// Marks the delivery delivered and schedules its removal. A repeated call
    /// returns the record unchanged and schedules nothing.
    #[instrument(skip(self))]
    pub async fn complete_delivery(
        &self,
        delivery_id: DeliveryId,
        final_location: Coordinate,
    ) -> Result<DeliveryTracking, DeliveryError> {
        final_location.validate()?;
        let completion = self.deliveries.complete(delivery_id.clone(), final_location).await?;
        if completion.newly_completed {
            self.simulation
                .retention
                .schedule(delivery_id, self.config.tracking.retention());
        }
        Ok(completion.tracking)
    }

    #[instrument(skip(self, telemetry))]
    pub async fn report_vehicle_status(
        &self,
        vehicle_id: VehicleId,
        telemetry: VehicleTelemetry,
    ) -> Result<VehicleStatus, VehicleError> {
        let report = VehicleReport {
            telemetry,
            reported_at: self.clock.now(),
        };
        self.vehicles.report_status(vehicle_id, report).await
    }

    /// Publishes `emergency_alert` for a driver.
    #[instrument(skip(self, message))]
    pub fn raise_emergency_alert(
        &self,
        driver_id: DriverId,
        kind: &str,
        location: Coordinate,
        message: &str,
    ) -> Result<EmergencyAlert, InvalidCoordinate> {
        location.validate()?;
        let alert = EmergencyAlert {
            driver_id,
            kind: kind.to_string(),
            location,
            message: message.to_string(),
            raised_at: self.clock.now(),
        };
        warn!(driver_id = %alert.driver_id, kind, "Emergency alert");
        self.events.publish(&TrackingEvent::EmergencyAlert(alert.clone()));
        Ok(alert)
    }

    /// Runs one simulation step now, independent of the timer.
    pub async fn tick(&self) -> Result<TickSummary, DeliveryError> {
        self.simulation.tick().await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every live record, including completed ones still inside retention.
    pub async fn get_active_deliveries(&self) -> Result<Vec<DeliveryTracking>, DeliveryError> {
        let mut all = self.deliveries.list().await?;
        all.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.delivery_id.cmp(&b.delivery_id)));
        Ok(all)
    }

    pub async fn get_delivery_tracking(&self, delivery_id: DeliveryId) -> Result<Option<DeliveryTracking>, DeliveryError> {
        self.deliveries.get(delivery_id).await
    }

    pub async fn get_driver_location(&self, driver_id: DriverId) -> Result<Option<DriverLocation>, DriverError> {
        self.drivers.get(driver_id).await
    }

    pub async fn get_vehicle_status(&self, vehicle_id: VehicleId) -> Result<Option<VehicleStatus>, VehicleError> {
        self.vehicles.get(vehicle_id).await
    }

    // =========================================================================
    // Routing
    // =========================================================================

    pub async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: &RouteOptions,
    ) -> Result<Arc<Route>, RoutingError> {
        self.optimizer.get_optimized_route(origin, destination, options).await
    }

    pub fn optimize_stop_order(
        &self,
        stops: Vec<DeliveryStop>,
        start: Coordinate,
    ) -> Result<Vec<OrderedStop<DeliveryStop>>, RoutingError> {
        self.optimizer.optimize_multiple_deliveries(stops, start)
    }

    pub fn traffic_report(&self, route: &Route) -> TrafficReport {
        self.optimizer.get_traffic_data(route)
    }

    pub fn sweep_route_cache(&self) -> usize {
        self.optimizer.sweep_cache()
    }

    // =========================================================================
    // Stats and snapshots
    // =========================================================================

    pub async fn stats(&self) -> Result<TrackingStats, TrackingError> {
        let deliveries = self.deliveries.list().await?;
        let completed = deliveries.iter().filter(|t| t.is_completed()).count();
        Ok(TrackingStats {
            live_deliveries: deliveries.len(),
            in_progress: deliveries.len() - completed,
            completed,
            drivers: self.drivers.list().await?.len(),
            vehicles: self.vehicles.list().await?.len(),
            cached_routes: self.optimizer.cached_routes(),
            subscribers: self.events.subscriber_count(),
            pending_removals: self.simulation.retention.pending(),
        })
    }

    pub async fn snapshot(&self) -> Result<TrackingSnapshot, TrackingError> {
        Ok(TrackingSnapshot {
            taken_at: self.clock.now(),
            deliveries: self.get_active_deliveries().await?,
            drivers: self.drivers.list().await?,
            vehicles: self.vehicles.list().await?,
        })
    }

    /// Loads a snapshot without publishing events. Completed deliveries get
    /// whatever is left of their retention window. Returns the record count.
    pub async fn restore(&self, snapshot: TrackingSnapshot) -> Result<usize, TrackingError> {
        let completed: Vec<DeliveryTracking> = snapshot
            .deliveries
            .iter()
            .filter(|t| t.is_completed())
            .cloned()
            .collect();

        let mut loaded = self.deliveries.load(snapshot.deliveries).await?;
        loaded += self.drivers.load(snapshot.drivers).await?;
        loaded += self.vehicles.load(snapshot.vehicles).await?;

        self.rearm_retention(completed);
        info!(loaded, taken_at = %snapshot.taken_at, "Snapshot restored");
        Ok(loaded)
    }
}
