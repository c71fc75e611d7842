//! Deferred removal of completed deliveries.
//!
//! One cancellable Tokio task per delivery id. Stopping the system aborts all
//! of them so no timer outlives the service.

use crate::clients::DeliveryClient;
use crate::delivery_actor::DeliveryError;
use crate::model::DeliveryId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A pending removal. `generation` tells a finished task whether the map
/// entry is still its own or belongs to a later schedule for the same id.
struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

type Timers = Arc<Mutex<HashMap<DeliveryId, Timer>>>;

#[derive(Clone)]
pub struct RetentionScheduler {
    deliveries: DeliveryClient,
    timers: Timers,
    generations: Arc<AtomicU64>,
}

impl RetentionScheduler {
    pub fn new(deliveries: DeliveryClient) -> Self {
        Self {
            deliveries,
            timers: Arc::default(),
            generations: Arc::default(),
        }
    }

    /// Removes `id` after `delay`, replacing any timer already pending for it.
    pub fn schedule(&self, id: DeliveryId, delay: Duration) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = timers.remove(&id) {
            previous.handle.abort();
        }
        let timer = self.spawn_timer(id.clone(), delay);
        timers.insert(id, timer);
    }

    /// Like [`schedule`](Self::schedule) but leaves a pending timer alone.
    pub fn schedule_if_absent(&self, id: DeliveryId, delay: Duration) -> bool {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        if timers.get(&id).is_some_and(|t| !t.handle.is_finished()) {
            return false;
        }
        let timer = self.spawn_timer(id.clone(), delay);
        timers.insert(id, timer);
        true
    }

    /// Aborts every pending removal and hands back the handles so callers can
    /// wait for the tasks to wind down.
    pub fn cancel_all(&self) -> Vec<JoinHandle<()>> {
        let drained: Vec<_> = self
            .timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .map(|(_, timer)| timer.handle)
            .collect();
        for handle in &drained {
            handle.abort();
        }
        if !drained.is_empty() {
            info!(cancelled = drained.len(), "Retention timers cancelled");
        }
        drained
    }

    pub fn pending(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|t| !t.handle.is_finished())
            .count()
    }

    fn spawn_timer(&self, id: DeliveryId, delay: Duration) -> Timer {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let deliveries = self.deliveries.clone();
        let timers = self.timers.clone();
        debug!(delivery_id = %id, ?delay, generation, "Retention scheduled");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match deliveries.remove(id.clone()).await {
                Ok(()) => info!(delivery_id = %id, "Retention expired, record removed"),
                Err(DeliveryError::NotFound(_)) => debug!(delivery_id = %id, "Record already gone"),
                Err(e) => warn!(delivery_id = %id, error = %e, "Retention removal failed"),
            }
            release(&timers, &id, generation);
        });
        Timer { generation, handle }
    }
}

/// Drops the entry for `id` only if it still belongs to `generation`.
fn release(timers: &Timers, id: &DeliveryId, generation: u64) -> bool {
    let mut timers = timers.lock().unwrap_or_else(|e| e.into_inner());
    match timers.get(id) {
        Some(timer) if timer.generation == generation => {
            timers.remove(id);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery_actor;

    fn scheduler() -> RetentionScheduler {
        let (_actor, client) = delivery_actor::new(8);
        RetentionScheduler::new(DeliveryClient::new(client))
    }

    fn generation_of(scheduler: &RetentionScheduler, id: &DeliveryId) -> Option<u64> {
        scheduler.timers.lock().unwrap().get(id).map(|t| t.generation)
    }

    #[tokio::test]
    async fn test_finished_timer_leaves_newer_schedule_alone() {
        let scheduler = scheduler();
        let id = DeliveryId::from("D1");

        scheduler.schedule(id.clone(), Duration::from_secs(3600));
        let first = generation_of(&scheduler, &id).unwrap();
        scheduler.schedule(id.clone(), Duration::from_secs(3600));
        let second = generation_of(&scheduler, &id).unwrap();
        assert_ne!(first, second);

        // the replaced task finishing late must not evict its successor
        assert!(!release(&scheduler.timers, &id, first));
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.cancel_all().len(), 1);

        scheduler.schedule(id.clone(), Duration::from_secs(3600));
        let third = generation_of(&scheduler, &id).unwrap();
        assert!(release(&scheduler.timers, &id, third));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_schedule_if_absent_keeps_pending_timer() {
        let scheduler = scheduler();
        let id = DeliveryId::from("D1");

        assert!(scheduler.schedule_if_absent(id.clone(), Duration::from_secs(60)));
        let generation = generation_of(&scheduler, &id);
        assert!(!scheduler.schedule_if_absent(id.clone(), Duration::from_secs(10)));
        assert_eq!(generation_of(&scheduler, &id), generation);
        assert_eq!(scheduler.pending(), 1);

        scheduler.cancel_all();
        assert_eq!(scheduler.pending(), 0);
    }
}
