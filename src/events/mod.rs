//! # Event fan-out
//!
//! In-memory pub/sub keyed by event name. Tracking actors publish from inside
//! their sequential loops, so events for one delivery arrive in mutation order.
//!
//! Each subscriber is isolated: a callback that returns `Err` or panics is
//! logged and skipped, and the remaining subscribers still run.

use crate::model::{DeliveryTracking, DriverLocation, EmergencyAlert, VehicleStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DeliveryStarted,
    DeliveryUpdated,
    DeliveryCompleted,
    LocationUpdated,
    VehicleStatusUpdated,
    EmergencyAlert,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::DeliveryStarted,
        EventKind::DeliveryUpdated,
        EventKind::DeliveryCompleted,
        EventKind::LocationUpdated,
        EventKind::VehicleStatusUpdated,
        EventKind::EmergencyAlert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DeliveryStarted => "delivery_started",
            EventKind::DeliveryUpdated => "delivery_updated",
            EventKind::DeliveryCompleted => "delivery_completed",
            EventKind::LocationUpdated => "location_updated",
            EventKind::VehicleStatusUpdated => "vehicle_status_updated",
            EventKind::EmergencyAlert => "emergency_alert",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event name: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// An event and the entity snapshot it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum TrackingEvent {
    DeliveryStarted(DeliveryTracking),
    DeliveryUpdated(DeliveryTracking),
    DeliveryCompleted(DeliveryTracking),
    LocationUpdated(DriverLocation),
    VehicleStatusUpdated(VehicleStatus),
    EmergencyAlert(EmergencyAlert),
}

impl TrackingEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TrackingEvent::DeliveryStarted(_) => EventKind::DeliveryStarted,
            TrackingEvent::DeliveryUpdated(_) => EventKind::DeliveryUpdated,
            TrackingEvent::DeliveryCompleted(_) => EventKind::DeliveryCompleted,
            TrackingEvent::LocationUpdated(_) => EventKind::LocationUpdated,
            TrackingEvent::VehicleStatusUpdated(_) => EventKind::VehicleStatusUpdated,
            TrackingEvent::EmergencyAlert(_) => EventKind::EmergencyAlert,
        }
    }
}

/// Failure reported by a subscriber callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl From<&str> for SubscriberError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

impl From<String> for SubscriberError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

pub type Callback = Arc<dyn Fn(&TrackingEvent) -> Result<(), SubscriberError> + Send + Sync>;

type Registry = RwLock<HashMap<EventKind, Vec<(u64, Callback)>>>;

/// Shared publish/subscribe hub. Clones share the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
    next_id: Arc<AtomicU64>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `kind`. Keep the handle to unsubscribe later;
    /// dropping it leaves the subscription in place.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&TrackingEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));
        debug!(event = %kind, subscription = id, "Subscribed");
        Subscription {
            registry: Arc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    /// Invokes every subscriber of the event's kind and returns how many
    /// succeeded. The registry lock is released before any callback runs.
    pub fn publish(&self, event: &TrackingEvent) -> usize {
        let kind = event.kind();
        let callbacks: Vec<(u64, Callback)> = self
            .registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut delivered = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => warn!(event = %kind, subscription = id, error = %e, "Subscriber failed"),
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    warn!(event = %kind, subscription = id, reason, "Subscriber panicked");
                }
            }
        }
        debug!(event = %kind, delivered, "Published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(Vec::len)
            .sum()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Registry>,
    kind: EventKind,
    id: u64,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Removes the callback. Returns false if the bus is gone or the callback
    /// was already removed.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.write().unwrap_or_else(|e| e.into_inner());
        let Some(callbacks) = registry.get_mut(&self.kind) else {
            return false;
        };
        let before = callbacks.len();
        callbacks.retain(|(id, _)| *id != self.id);
        let removed = callbacks.len() < before;
        if callbacks.is_empty() {
            registry.remove(&self.kind);
        }
        debug!(event = %self.kind, subscription = self.id, removed, "Unsubscribed");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::model::DriverId;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;

    fn alert() -> TrackingEvent {
        TrackingEvent::EmergencyAlert(EmergencyAlert {
            driver_id: DriverId::from("drv1"),
            kind: "breakdown".into(),
            location: Coordinate::new(-1.28, 36.82),
            message: "engine failure".into(),
            raised_at: Utc::now(),
        })
    }

    #[test]
    fn test_event_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert!("delivery_lost".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_failing_subscribers_do_not_stop_fan_out() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let _erring = bus.subscribe(EventKind::EmergencyAlert, |_| Err("relay offline".into()));
        let _panicking = bus.subscribe(EventKind::EmergencyAlert, |_| panic!("subscriber bug"));
        let counter = hits.clone();
        let _healthy = bus.subscribe(EventKind::EmergencyAlert, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(bus.publish(&alert()), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_only_matching_kind_is_invoked() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let _sub = bus.subscribe(EventKind::DeliveryStarted, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(bus.publish(&alert()), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_removes_callback() {
        let bus = EventBus::new();
        let sub = bus.subscribe(EventKind::EmergencyAlert, |_| Ok(()));
        assert_eq!(bus.subscriber_count(), 1);
        assert!(sub.unsubscribe());
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(&alert()), 0);
    }

    #[test]
    fn test_event_serializes_with_name_tag() {
        let value = serde_json::to_value(alert()).unwrap();
        assert_eq!(value["event"], "emergency_alert");
        assert_eq!(value["data"]["driver_id"], "drv1");
    }
}
