//! Client configuration.
//!
//! The defaults live in `config/default.toml`, embedded at compile time.
//! A deployment can replace them with its own TOML file, and individual
//! values can be overridden through environment variables.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::ClientError;

/// Embedded default configuration.
const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Overrides the dashboard API base URL.
pub const API_URL_ENV: &str = "ANOMALY_ATLAS_API_URL";
/// Overrides the state boundary `GeoJSON` URL.
pub const GEOJSON_URL_ENV: &str = "ANOMALY_ATLAS_GEOJSON_URL";
/// Overrides the per-request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "ANOMALY_ATLAS_TIMEOUT_SECS";

/// Where and how to reach the dashboard API.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Scheme and authority of the dashboard API (e.g. `"http://127.0.0.1:5000"`).
    pub base_url: String,
    /// Full URL of the state boundary `FeatureCollection`.
    pub geometry_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Endpoint paths, relative to `base_url`.
    pub endpoints: EndpointPaths,
    /// Retry behaviour for transient failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Endpoint paths of the dashboard API.
///
/// Paths missing from a configuration file keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    /// National summary.
    pub summary: String,
    /// Per-state summary listing.
    pub states: String,
    /// Detailed record for one state (`?state=`).
    pub state: String,
    /// District breakdown for one state (`?state=`).
    pub state_districts: String,
    /// Analysis report.
    pub analysis_report: String,
    /// States offered by the prediction form.
    pub prediction_states: String,
    /// Risk prediction (POST).
    pub predict: String,
    /// Policy recommendations.
    pub policy_recommendations: String,
    /// Task list (POST creates a task).
    pub tasks: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            summary: "/api/dashboard/summary".to_string(),
            states: "/api/dashboard/states".to_string(),
            state: "/api/dashboard/state".to_string(),
            state_districts: "/api/dashboard/state/districts".to_string(),
            analysis_report: "/analysis/api/report".to_string(),
            prediction_states: "/prediction/api/states".to_string(),
            predict: "/prediction/api/predict".to_string(),
            policy_recommendations: "/policies/api/recommendations".to_string(),
            tasks: "/todo/api/tasks".to_string(),
        }
    }
}

/// Exponential backoff settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Returns the embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. It is a compile-time
    /// constant, so this indicates a development error caught by tests.
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded client config: {e}"))
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the text is not a valid
    /// configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ClientError> {
        let config: Self = toml::de::from_str(text).map_err(|e| ClientError::Config {
            message: format!("Invalid client config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from `path` (or the embedded defaults when
    /// `None`), then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the file cannot be read or
    /// parsed, or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ClientError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| ClientError::Config {
                    message: format!("Failed to read {}: {e}", path.display()),
                })?;
                log::debug!("Loaded client config from {}", path.display());
                Self::from_toml_str(&text)?
            }
            None => Self::embedded(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides looked up by environment variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if an override value is invalid.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            log::debug!("{API_URL_ENV} overrides base_url: {url}");
            self.base_url = url;
        }
        if let Some(url) = lookup(GEOJSON_URL_ENV) {
            log::debug!("{GEOJSON_URL_ENV} overrides geometry_url: {url}");
            self.geometry_url = url;
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            self.timeout_secs = secs.trim().parse().map_err(|_| ClientError::Config {
                message: format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{secs}'"),
            })?;
        }
        self.validate()
    }

    /// Checks that URLs are absolute HTTP(S) URLs and the timeout is
    /// non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] describing the first problem.
    pub fn validate(&self) -> Result<(), ClientError> {
        for (field, url) in [
            ("base_url", &self.base_url),
            ("geometry_url", &self.geometry_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ClientError::Config {
                    message: format!("{field} must be an http(s) URL, got '{url}'"),
                });
            }
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Joins an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
