//! External lookups used while assembling a route.
//!
//! Reverse geocoding and weather are optional enrichments: each call runs under
//! a timeout with bounded, exponentially backed-off retries, and a final
//! failure yields `None` so the route is still produced. No lock or actor
//! mailbox is held while a call is in flight.

use crate::config::ProvidersConfig;
use crate::env::SharedRandom;
use crate::geo::Coordinate;
use crate::model::WeatherConditions;
use crate::routing::ProviderError;
use async_trait::async_trait;
use std::future::Future;
use tracing::{debug, warn};

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherConditions, ProviderError>;
}

/// Offline geocoder that names a point by its rounded coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticGeocoder;

#[async_trait]
impl Geocoder for SyntheticGeocoder {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<String, ProviderError> {
        Ok(format!("Location near {:.4}, {:.4}", at.latitude, at.longitude))
    }
}

/// Offline weather drawn from the injected random source.
pub struct SyntheticWeather {
    random: SharedRandom,
}

impl SyntheticWeather {
    pub fn new(random: SharedRandom) -> Self {
        Self { random }
    }
}

const CONDITIONS: [&str; 4] = ["clear", "cloudy", "light_rain", "heavy_rain"];

#[async_trait]
impl WeatherProvider for SyntheticWeather {
    async fn current_weather(&self, _at: Coordinate) -> Result<WeatherConditions, ProviderError> {
        let condition = CONDITIONS[self.random.index(CONDITIONS.len())];
        let visibility_km = match condition {
            "heavy_rain" => 2.0,
            "light_rain" => 6.0,
            _ => 10.0,
        };
        Ok(WeatherConditions {
            condition: condition.to_string(),
            temperature_c: 18.0 + self.random.unit() * 12.0,
            wind_kmh: self.random.unit() * 30.0,
            visibility_km,
        })
    }
}

/// Runs `call` until it succeeds, timing out each attempt and retrying up to
/// `settings.max_retries` times. Gives up with `None`.
pub async fn call_with_retries<T, F, Fut>(
    lookup: &'static str,
    settings: &ProvidersConfig,
    mut call: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let timeout = settings.timeout();
    for attempt in 0..=settings.max_retries {
        let outcome = match tokio::time::timeout(timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout)),
        };
        match outcome {
            Ok(value) => {
                debug!(lookup, attempt, "Lookup succeeded");
                return Some(value);
            }
            Err(e) if attempt < settings.max_retries => {
                let delay = settings.backoff(attempt);
                debug!(lookup, attempt, error = %e, ?delay, "Lookup failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => warn!(lookup, attempt, error = %e, "Lookup failed, omitting field"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct Flaky {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Geocoder for Flaky {
        async fn reverse_geocode(&self, _at: Coordinate) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(ProviderError::Unavailable("503".into()));
            }
            Ok("Mombasa Road".into())
        }
    }

    struct Hanging;

    #[async_trait]
    impl Geocoder for Hanging {
        async fn reverse_geocode(&self, _at: Coordinate) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".into())
        }
    }

    const AT: Coordinate = Coordinate::new(-1.3, 36.85);

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let geocoder = Arc::new(Flaky {
            failures_left: AtomicU32::new(1),
            calls: AtomicU32::new(0),
        });
        let settings = ProvidersConfig::default();
        let g = geocoder.clone();
        let address = call_with_retries("reverse_geocode", &settings, || {
            let g = g.clone();
            async move { g.reverse_geocode(AT).await }
        })
        .await;
        assert_eq!(address.as_deref(), Some("Mombasa Road"));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_bounded_retries() {
        let geocoder = Arc::new(Flaky {
            failures_left: AtomicU32::new(10),
            calls: AtomicU32::new(0),
        });
        let settings = ProvidersConfig::default();
        let g = geocoder.clone();
        let address = call_with_retries("reverse_geocode", &settings, || {
            let g = g.clone();
            async move { g.reverse_geocode(AT).await }
        })
        .await;
        assert_eq!(address, None);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_times_out() {
        let settings = ProvidersConfig::default();
        let started = tokio::time::Instant::now();
        let hanging = Hanging;
        let address = call_with_retries("reverse_geocode", &settings, || hanging.reverse_geocode(AT)).await;
        assert_eq!(address, None);
        // three 2 s timeouts plus 100 ms and 200 ms of backoff
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(6300) && elapsed < Duration::from_millis(6400));
    }
}
