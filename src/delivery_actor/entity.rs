//! [`ActorEntity`] implementation for [`DeliveryTracking`].

use super::actions::{Completion, DeliveryAction, DeliveryActionResult, StepOutcome};
use super::error::DeliveryError;
use super::DeliveryContext;
use crate::events::TrackingEvent;
use crate::geo::{self, Coordinate};
use crate::model::{
    Checkpoint, CheckpointKind, DeliveryId, DeliveryStatus, DeliveryTracking, LocationFix, StartTracking, TrackingId,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

const MILESTONES: [u8; 4] = [25, 50, 75, 100];

#[async_trait]
impl ActorEntity for DeliveryTracking {
    type Id = DeliveryId;
    type Create = StartTracking;
    type Update = LocationFix;
    type Action = DeliveryAction;
    type ActionResult = DeliveryActionResult;
    type Context = DeliveryContext;
    type Error = DeliveryError;

    /// Opens a session at the route origin with a `Departed` checkpoint.
    fn from_create_params(id: DeliveryId, params: StartTracking) -> Result<Self, DeliveryError> {
        let origin = params.route.origin.validate()?;
        params.route.destination.validate()?;

        Ok(Self {
            tracking_id: TrackingId::generate(),
            delivery_id: id,
            driver_id: params.driver_id,
            vehicle_id: params.vehicle_id,
            status: DeliveryStatus::InProgress,
            started_at: params.started_at,
            completed_at: None,
            current_location: LocationFix::at(origin, params.started_at),
            progress: 0,
            estimated_arrival: params.started_at,
            checkpoints: vec![Checkpoint {
                coordinate: origin,
                timestamp: params.started_at,
                kind: CheckpointKind::Departed,
            }],
            last_milestone: 0,
            route: params.route,
        })
    }

    async fn on_create(&mut self, ctx: &DeliveryContext) -> Result<(), DeliveryError> {
        self.estimated_arrival = eta(self.started_at, self.total_km(), ctx.average_speed_kmh);
        info!(delivery_id = %self.delivery_id, driver_id = %self.driver_id, eta = %self.estimated_arrival, "Tracking started");
        ctx.events.publish(&TrackingEvent::DeliveryStarted(self.clone()));
        Ok(())
    }

    /// Applies a position fix. Completed deliveries ignore it.
    async fn on_update(&mut self, fix: LocationFix, ctx: &DeliveryContext) -> Result<(), DeliveryError> {
        fix.coordinate.validate()?;
        if self.is_completed() {
            debug!(delivery_id = %self.delivery_id, "Ignoring fix for completed delivery");
            return Ok(());
        }
        self.apply_fix(fix, ctx);
        Ok(())
    }

    async fn on_delete(&self, _ctx: &DeliveryContext) -> Result<(), DeliveryError> {
        info!(delivery_id = %self.delivery_id, status = ?self.status, "Tracking record removed");
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: DeliveryAction,
        ctx: &DeliveryContext,
    ) -> Result<DeliveryActionResult, DeliveryError> {
        match action {
            DeliveryAction::Advance {
                step_km,
                arrival_radius_km,
                speed_kmh,
            } => {
                if self.is_completed() {
                    return Ok(DeliveryActionResult::Advance(StepOutcome::Idle));
                }
                let here = self.current_location.coordinate;
                if self.remaining_km() < arrival_radius_km {
                    let completion = self.complete(here, ctx);
                    return Ok(DeliveryActionResult::Advance(StepOutcome::Arrived(completion)));
                }
                let next = geo::step_toward(here, self.destination(), step_km);
                let fix = LocationFix {
                    coordinate: next,
                    speed_kmh: Some(speed_kmh),
                    heading_deg: Some(geo::bearing_deg(here, next)),
                    accuracy_m: None,
                    timestamp: ctx.clock.now(),
                };
                self.apply_fix(fix, ctx);
                Ok(DeliveryActionResult::Advance(StepOutcome::Moved(self.clone())))
            }
            DeliveryAction::Complete { final_location } => {
                final_location.validate()?;
                Ok(DeliveryActionResult::Complete(self.complete(final_location, ctx)))
            }
        }
    }
}

impl DeliveryTracking {
    fn apply_fix(&mut self, fix: LocationFix, ctx: &DeliveryContext) {
        self.current_location = fix;
        self.progress = progress_percent(self.remaining_km(), self.total_km());
        self.estimated_arrival = eta(fix.timestamp, self.remaining_km(), ctx.average_speed_kmh);

        for milestone in MILESTONES {
            if self.progress >= milestone && milestone > self.last_milestone {
                self.checkpoints.push(Checkpoint {
                    coordinate: fix.coordinate,
                    timestamp: fix.timestamp,
                    kind: CheckpointKind::Milestone { percent: milestone },
                });
                self.last_milestone = milestone;
                info!(delivery_id = %self.delivery_id, milestone, "Milestone reached");
            }
        }

        debug!(delivery_id = %self.delivery_id, progress = self.progress, "Delivery updated");
        ctx.events.publish(&TrackingEvent::DeliveryUpdated(self.clone()));
    }

    fn complete(&mut self, final_location: Coordinate, ctx: &DeliveryContext) -> Completion {
        if self.is_completed() {
            debug!(delivery_id = %self.delivery_id, "Already completed");
            return Completion {
                tracking: self.clone(),
                newly_completed: false,
            };
        }

        let now = ctx.clock.now();
        self.status = DeliveryStatus::Completed;
        self.progress = 100;
        self.completed_at = Some(now);
        self.estimated_arrival = now;
        self.current_location = LocationFix::at(final_location, now);
        self.checkpoints.push(Checkpoint {
            coordinate: final_location,
            timestamp: now,
            kind: CheckpointKind::Delivered,
        });

        info!(delivery_id = %self.delivery_id, "Delivery completed");
        ctx.events.publish(&TrackingEvent::DeliveryCompleted(self.clone()));
        Completion {
            tracking: self.clone(),
            newly_completed: true,
        }
    }
}

/// `round((1 - remaining / total) * 100)` clamped to `[0, 100]`; a zero-length
/// trip counts as done.
pub fn progress_percent(remaining_km: f64, total_km: f64) -> u8 {
    if total_km <= f64::EPSILON {
        return 100;
    }
    ((1.0 - remaining_km / total_km) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// `from` plus the travel time at `speed_kmh`. A travel time that does not fit
/// a timestamp (zero or vanishing speed) leaves the estimate at `from`.
fn eta(from: DateTime<Utc>, distance_km: f64, speed_kmh: f64) -> DateTime<Utc> {
    let seconds = (distance_km / speed_kmh * 3600.0).round();
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        warn!(distance_km, speed_kmh, "Travel time out of range, ETA not advanced");
        return from;
    }
    Duration::try_seconds(seconds as i64)
        .and_then(|travel| from.checked_add_signed(travel))
        .unwrap_or_else(|| {
            warn!(distance_km, speed_kmh, "Travel time out of range, ETA not advanced");
            from
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ManualClock;
    use crate::events::{EventBus, EventKind};
    use crate::model::{
        DriverId, Route, RouteId, TrafficConditions, TrafficLevel, VehicleClass, VehicleId,
    };
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    const ORIGIN: Coordinate = Coordinate::new(-1.2921, 36.8219);
    const DESTINATION: Coordinate = Coordinate::new(-1.3200, 36.8500);

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
    }

    fn route(origin: Coordinate, destination: Coordinate) -> Arc<Route> {
        Arc::new(Route {
            id: RouteId::generate(),
            origin,
            origin_address: None,
            destination,
            destination_address: None,
            waypoints: vec![],
            distance_km: geo::distance_km(origin, destination),
            duration_minutes: 5,
            fuel_cost: 0.0,
            toll_cost: 0.0,
            traffic: TrafficConditions {
                factor: 1.0,
                level: TrafficLevel::Light,
                delay_minutes: 0,
            },
            weather: None,
            instructions: vec![],
            vehicle_class: VehicleClass::Van,
            created_at: start(),
        })
    }

    fn context() -> (DeliveryContext, Arc<Mutex<Vec<EventKind>>>) {
        let events = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let seen = seen.clone();
            // subscriptions live as long as the bus
            let _ = events.subscribe(kind, move |event| {
                seen.lock().unwrap().push(event.kind());
                Ok(())
            });
        }
        let ctx = DeliveryContext {
            events,
            clock: Arc::new(ManualClock::new(start())),
            average_speed_kmh: 50.0,
        };
        (ctx, seen)
    }

    async fn started(ctx: &DeliveryContext) -> DeliveryTracking {
        let mut tracking = DeliveryTracking::from_create_params(
            DeliveryId::from("D1"),
            StartTracking {
                driver_id: DriverId::from("drv1"),
                vehicle_id: VehicleId::from("veh1"),
                route: route(ORIGIN, DESTINATION),
                started_at: start(),
            },
        )
        .unwrap();
        tracking.on_create(ctx).await.unwrap();
        tracking
    }

    fn advance() -> DeliveryAction {
        DeliveryAction::Advance {
            step_km: 1.0,
            arrival_radius_km: 0.1,
            speed_kmh: 120.0,
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(10.0, 10.0), 0);
        assert_eq!(progress_percent(2.5, 10.0), 75);
        assert_eq!(progress_percent(12.0, 10.0), 0);
        assert_eq!(progress_percent(0.0, 0.0), 100);
    }

    #[tokio::test]
    async fn test_start_sets_departed_checkpoint_and_eta() {
        let (ctx, seen) = context();
        let tracking = started(&ctx).await;
        assert_eq!(tracking.progress, 0);
        assert_eq!(tracking.current_location.coordinate, ORIGIN);
        assert_eq!(tracking.checkpoints.len(), 1);
        assert_eq!(tracking.checkpoints[0].kind, CheckpointKind::Departed);
        let expected = eta(start(), tracking.total_km(), 50.0);
        assert_eq!(tracking.estimated_arrival, expected);
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::DeliveryStarted]);
    }

    #[test]
    fn test_eta_survives_degenerate_speed() {
        assert_eq!(eta(start(), 12.0, 0.0), start());
        assert_eq!(eta(start(), 12.0, 1e-300), start());
        assert_eq!(eta(start(), 12.0, 1e-9), start());
        assert_eq!(eta(start(), 0.0, 0.0), start());
        assert_eq!(eta(start(), 50.0, 50.0), start() + Duration::hours(1));
    }

    #[tokio::test]
    async fn test_vanishing_speed_does_not_break_tracking() {
        let (mut ctx, _seen) = context();
        ctx.average_speed_kmh = 1e-300;
        let mut tracking = started(&ctx).await;
        assert_eq!(tracking.estimated_arrival, start());

        let midway = geo::intermediate_point(ORIGIN, DESTINATION, 0.5);
        tracking.on_update(LocationFix::at(midway, start()), &ctx).await.unwrap();
        assert_eq!(tracking.progress, 50);
    }

    #[test]
    fn test_invalid_route_rejected() {
        let err = DeliveryTracking::from_create_params(
            DeliveryId::from("D2"),
            StartTracking {
                driver_id: DriverId::from("drv1"),
                vehicle_id: VehicleId::from("veh1"),
                route: route(ORIGIN, Coordinate::new(95.0, 36.0)),
                started_at: start(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidCoordinate(_)));
    }

    #[tokio::test]
    async fn test_milestones_use_threshold_crossing() {
        let (ctx, _) = context();
        let mut tracking = started(&ctx).await;
        // Jump straight past 50%: both 25 and 50 are recorded once.
        let fix = LocationFix::at(geo::intermediate_point(ORIGIN, DESTINATION, 0.6), start());
        tracking.on_update(fix, &ctx).await.unwrap();
        assert_eq!(tracking.progress, 60);
        let milestones: Vec<_> = tracking
            .checkpoints
            .iter()
            .filter_map(|c| match c.kind {
                CheckpointKind::Milestone { percent } => Some(percent),
                _ => None,
            })
            .collect();
        assert_eq!(milestones, vec![25, 50]);

        // Falling back and returning does not duplicate.
        tracking.on_update(LocationFix::at(ORIGIN, start()), &ctx).await.unwrap();
        tracking.on_update(fix, &ctx).await.unwrap();
        assert_eq!(tracking.checkpoints.len(), 3);
    }

    #[tokio::test]
    async fn test_stepper_reaches_destination_then_completes() {
        let (ctx, seen) = context();
        let mut tracking = started(&ctx).await;
        let mut last_progress = 0;
        let mut arrived = None;
        for _ in 0..20 {
            match tracking.handle_action(advance(), &ctx).await.unwrap() {
                DeliveryActionResult::Advance(StepOutcome::Moved(t)) => {
                    assert!(t.progress >= last_progress);
                    last_progress = t.progress;
                }
                DeliveryActionResult::Advance(StepOutcome::Arrived(c)) => {
                    arrived = Some(c);
                    break;
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
        let completion = arrived.expect("arrived within 20 steps");
        assert!(completion.newly_completed);
        assert_eq!(completion.tracking.progress, 100);
        assert_eq!(completion.tracking.delivered_checkpoints(), 1);
        assert_eq!(completion.tracking.current_location.coordinate, DESTINATION);
        assert_eq!(seen.lock().unwrap().last(), Some(&EventKind::DeliveryCompleted));

        match tracking.handle_action(advance(), &ctx).await.unwrap() {
            DeliveryActionResult::Advance(StepOutcome::Idle) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_is_idempotent() {
        let (ctx, seen) = context();
        let mut tracking = started(&ctx).await;
        let action = || DeliveryAction::Complete {
            final_location: DESTINATION,
        };

        let first = match tracking.handle_action(action(), &ctx).await.unwrap() {
            DeliveryActionResult::Complete(c) => c,
            other => panic!("unexpected: {other:?}"),
        };
        assert!(first.newly_completed);
        let events_after_first = seen.lock().unwrap().len();

        let second = match tracking.handle_action(action(), &ctx).await.unwrap() {
            DeliveryActionResult::Complete(c) => c,
            other => panic!("unexpected: {other:?}"),
        };
        assert!(!second.newly_completed);
        assert_eq!(second.tracking, first.tracking);
        assert_eq!(tracking.delivered_checkpoints(), 1);
        assert_eq!(seen.lock().unwrap().len(), events_after_first);

        // Fixes after completion change nothing and emit nothing.
        tracking.on_update(LocationFix::at(ORIGIN, start()), &ctx).await.unwrap();
        assert_eq!(tracking.progress, 100);
        assert_eq!(seen.lock().unwrap().len(), events_after_first);
    }
}
