//! Exporter configuration.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use crate::exporter::{ResourceMetadata, TransportOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Default collector address.
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:4317";
/// Default number of records per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Default schema URL attached to every batch.
pub const DEFAULT_SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.12.0";
/// Service name used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "unknown_service";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable is set to a value that cannot be parsed.
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Exporter configuration.
///
/// Configuration values can be set via environment variables:
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector address (default: "127.0.0.1:4317")
/// - `OTEL_EXPORTER_OTLP_INSECURE`: plaintext unless "false", "f" or "0" (default: true)
/// - `OTEL_SERVICE_NAME`: `service.name` resource attribute (default: "`unknown_service`")
/// - `LOGWIRE_BATCH_SIZE`: records per batch, at least 1 (default: 100)
/// - `LOGWIRE_SCHEMA_URL`: schema URL of every batch
/// - `LOGWIRE_CONNECT_TIMEOUT_SECS`: connect timeout in seconds (default: 5)
/// - `LOGWIRE_REQUEST_TIMEOUT_SECS`: per-request timeout in seconds (default: 10)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ExporterConfig {
    /// Collector address.
    #[validate(length(min = 1, message = "Endpoint cannot be empty"))]
    pub endpoint: String,

    /// Use a plaintext channel.
    pub insecure: bool,

    /// Value of the `service.name` resource attribute.
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Records per batch.
    #[validate(range(min = 1, message = "Batch size must be at least 1"))]
    pub batch_size: usize,

    /// Schema URL attached to every batch.
    pub schema_url: String,

    /// Connect timeout in seconds.
    #[validate(range(min = 1))]
    pub connect_timeout_secs: u64,

    /// Per-request timeout in seconds.
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            insecure: true,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            schema_url: DEFAULT_SCHEMA_URL.to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

impl ExporterConfig {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A numeric variable is set but cannot be parsed
    /// - The resulting configuration fails validation
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(defaults.endpoint),
            insecure: lookup("OTEL_EXPORTER_OTLP_INSECURE")
                .map_or(defaults.insecure, |v| parse_insecure(&v)),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            batch_size: parse_var(&lookup, "LOGWIRE_BATCH_SIZE")?.unwrap_or(defaults.batch_size),
            schema_url: lookup("LOGWIRE_SCHEMA_URL").unwrap_or(defaults.schema_url),
            connect_timeout_secs: parse_var(&lookup, "LOGWIRE_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(defaults.connect_timeout_secs),
            request_timeout_secs: parse_var(&lookup, "LOGWIRE_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }

    /// Connection settings for [`GrpcTransport`](crate::GrpcTransport).
    #[must_use]
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            endpoint: self.endpoint.clone(),
            insecure: self.insecure,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Resource metadata carrying the schema URL and `service.name`.
    #[must_use]
    pub fn resource(&self) -> ResourceMetadata {
        ResourceMetadata::new(self.schema_url.clone()).with_service_name(self.service_name.clone())
    }
}

/// Any value other than "false", "f" or "0" keeps the channel plaintext.
fn parse_insecure(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "f" | "0")
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ExporterConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ExporterConfig::default());
        assert_eq!(config.endpoint, "127.0.0.1:4317");
        assert!(config.insecure);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_values_from_environment() {
        let config = ExporterConfig::from_lookup(lookup(&[
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "collector:4317"),
            ("OTEL_EXPORTER_OTLP_INSECURE", "false"),
            ("OTEL_SERVICE_NAME", "example application"),
            ("LOGWIRE_BATCH_SIZE", "2"),
            ("LOGWIRE_REQUEST_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "collector:4317");
        assert!(!config.insecure);
        assert_eq!(config.service_name, "example application");
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 5);
    }

    #[test]
    fn test_insecure_parsing() {
        for value in ["false", "F", "0", " False "] {
            assert!(!parse_insecure(value), "{value:?} should disable insecure");
        }
        for value in ["true", "1", "yes", ""] {
            assert!(parse_insecure(value), "{value:?} should keep insecure");
        }
    }

    #[test]
    fn test_unparseable_batch_size() {
        let result = ExporterConfig::from_lookup(lookup(&[("LOGWIRE_BATCH_SIZE", "many")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "LOGWIRE_BATCH_SIZE", .. })
        ));
    }

    #[test]
    fn test_zero_batch_size_fails_validation() {
        let result = ExporterConfig::from_lookup(lookup(&[("LOGWIRE_BATCH_SIZE", "0")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_endpoint_fails_validation() {
        let config = ExporterConfig {
            endpoint: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transport_options_and_resource() {
        let config = ExporterConfig {
            service_name: "checkout".to_string(),
            connect_timeout_secs: 3,
            ..Default::default()
        };

        let options = config.transport_options();
        assert_eq!(options.uri(), "http://127.0.0.1:4317");
        assert_eq!(options.connect_timeout, Duration::from_secs(3));

        let resource = config.resource();
        assert_eq!(resource.schema_url(), DEFAULT_SCHEMA_URL);
        assert_eq!(resource.to_proto().attributes[0].key, "service.name");
    }
}
