//! Configuration loading from disk.

use crate::config::schema::DispatchConfig;
use crate::config::validation::{validate_config, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DispatchConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DispatchConfig, ConfigError> {
    let config: DispatchConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, DispatchConfig::default());
        assert_eq!(config.tracking.tick_interval_secs, 30);
        assert_eq!(config.routing.cache_ttl_secs, 300);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = parse_config(
            r#"
            [tracking]
            tick_interval_secs = 5

            [traffic]
            peak_windows = [{ start_hour = 6, end_hour = 8 }]
            "#,
        )
        .unwrap();
        assert_eq!(config.tracking.tick_interval_secs, 5);
        assert_eq!(config.tracking.retention_secs, 3600);
        assert_eq!(config.traffic.peak_windows.len(), 1);
        assert_eq!(config.traffic.congestion_zones.len(), 1);
    }

    #[test]
    fn test_invalid_values_are_reported_together() {
        let err = parse_config(
            r#"
            [tracking]
            step_km = 0.0
            channel_capacity = 0
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
