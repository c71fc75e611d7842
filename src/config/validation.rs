//! Semantic validation.
//!
//! Serde handles shape; this checks ranges. Every problem is reported, not just
//! the first one.

use crate::config::schema::DispatchConfig;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let tracking = &config.tracking;
    if tracking.tick_interval_secs == 0 {
        errors.push(ValidationError::new("tracking.tick_interval_secs", "must be > 0"));
    }
    positive(&mut errors, "tracking.average_speed_kmh", tracking.average_speed_kmh);
    positive(&mut errors, "tracking.step_km", tracking.step_km);
    if !(tracking.arrival_radius_km.is_finite() && tracking.arrival_radius_km >= 0.0) {
        errors.push(ValidationError::new("tracking.arrival_radius_km", "must be >= 0"));
    }
    if tracking.channel_capacity == 0 {
        errors.push(ValidationError::new("tracking.channel_capacity", "must be > 0"));
    }

    let routing = &config.routing;
    positive(&mut errors, "routing.average_speed_kmh", routing.average_speed_kmh);
    non_negative(&mut errors, "routing.waypoint_jitter_deg", routing.waypoint_jitter_deg);
    non_negative(&mut errors, "routing.toll_threshold_km", routing.toll_threshold_km);
    non_negative(&mut errors, "routing.toll_rate_per_km", routing.toll_rate_per_km);
    non_negative(&mut errors, "routing.fuel_price_per_litre", routing.fuel_price_per_litre);
    probability(&mut errors, "routing.incident_probability", routing.incident_probability);

    let traffic = &config.traffic;
    if !(-12..=14).contains(&traffic.utc_offset_hours) {
        errors.push(ValidationError::new("traffic.utc_offset_hours", "must be within -12..=14"));
    }
    for window in &traffic.peak_windows {
        if window.start_hour > 23 || window.end_hour > 23 || window.start_hour > window.end_hour {
            errors.push(ValidationError::new(
                "traffic.peak_windows",
                format!("invalid window {}..={}", window.start_hour, window.end_hour),
            ));
        }
    }
    non_negative(&mut errors, "traffic.peak_penalty", traffic.peak_penalty);
    non_negative(&mut errors, "traffic.jitter", traffic.jitter);
    for zone in &traffic.congestion_zones {
        if let Err(e) = zone.center.validate() {
            errors.push(ValidationError::new("traffic.congestion_zones", format!("{}: {e}", zone.name)));
        }
        if !(zone.radius_km.is_finite() && zone.radius_km > 0.0) || !(zone.penalty.is_finite() && zone.penalty >= 0.0) {
            errors.push(ValidationError::new(
                "traffic.congestion_zones",
                format!("{}: radius must be > 0 and penalty >= 0", zone.name),
            ));
        }
    }

    let providers = &config.providers;
    if providers.timeout_ms == 0 {
        errors.push(ValidationError::new("providers.timeout_ms", "must be > 0"));
    }
    if providers.backoff_base_ms > providers.backoff_max_ms {
        errors.push(ValidationError::new("providers.backoff_base_ms", "must not exceed backoff_max_ms"));
    }

    if config.observability.log_level.trim().is_empty() {
        errors.push(ValidationError::new("observability.log_level", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn positive(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ValidationError::new(field, "must be a finite number > 0"));
    }
}

fn non_negative(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(ValidationError::new(field, "must be a finite number >= 0"));
    }
}

fn probability(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError::new(field, "must be within 0..=1"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PeakWindow;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&DispatchConfig::default()).is_ok());
    }

    #[test]
    fn test_reversed_peak_window_rejected() {
        let mut config = DispatchConfig::default();
        config.traffic.peak_windows.push(PeakWindow {
            start_hour: 20,
            end_hour: 18,
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "traffic.peak_windows");
    }

    #[test]
    fn test_probability_out_of_range() {
        let mut config = DispatchConfig::default();
        config.routing.incident_probability = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "routing.incident_probability");
    }
}
