#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the anomaly dashboard API.
//!
//! Fetches the national summary, the per-state listing, per-state detail,
//! the analysis report and policy recommendations from the dashboard API,
//! forwards prediction requests and new tasks to it, and downloads the
//! state boundary `FeatureCollection` from a third-party geometry host. Every
//! dashboard response is wrapped in an
//! [`ApiEnvelope`](anomaly_atlas_dashboard_models::ApiEnvelope) and is
//! unwrapped here, so callers only ever see payloads or a
//! [`ClientError`].
//!
//! The view layer depends on the [`provider`] traits rather than on
//! [`DashboardClient`] directly.

pub mod config;
pub mod provider;
pub mod retry;

use anomaly_atlas_dashboard_models::analysis::AnalysisReport;
use anomaly_atlas_dashboard_models::policy::{PolicyRecommendations, Task, TaskDraft};
use anomaly_atlas_dashboard_models::prediction::{PredictionRequest, PredictionResult};
use anomaly_atlas_dashboard_models::{ApiEnvelope, DashboardSummary, StateDistricts, StateStat};
use geojson::{FeatureCollection, GeoJson};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::{ClientConfig, RetryPolicy};
use crate::provider::{
    AnalysisProvider, GeometryProvider, PolicyProvider, PredictionProvider, StatsProvider,
};

/// Errors that can occur while talking to the dashboard API or the
/// geometry host.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server reported `success: false`, or omitted the payload.
    #[error("API error: {message}")]
    Protocol {
        /// Server-provided or synthesized reason.
        message: String,
    },

    /// Geometry response was not a `GeoJSON` `FeatureCollection`.
    #[error("Geometry error: {message}")]
    Geometry {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

impl ClientError {
    /// Whether the failure happened before a usable response arrived
    /// (network, timeout, non-success status).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// Client for the dashboard API and the state geometry host.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl DashboardClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("anomaly_atlas/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GETs an enveloped endpoint and returns its payload.
    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = self.config.endpoint_url(path);
        log::debug!("GET {url} {query:?}");
        let body =
            retry::send_text(|| self.http.get(&url).query(query), self.config.retry).await?;
        parse_envelope(&body)
    }

    /// POSTs a JSON body to an enveloped endpoint and returns its payload.
    async fn post_enveloped<B, T>(
        &self,
        path: &str,
        body: &B,
        policy: RetryPolicy,
    ) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint_url(path);
        log::debug!("POST {url}");
        let text = retry::send_text(|| self.http.post(&url).json(body), policy).await?;
        parse_envelope(&text)
    }
}

/// Parses an enveloped response body and unwraps its payload.
///
/// # Errors
///
/// Returns [`ClientError::Json`] if the body is not an envelope around
/// `T`, or [`ClientError::Protocol`] if the server reported failure.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body)?;
    envelope
        .into_data()
        .map_err(|e| ClientError::Protocol { message: e.message })
}

/// Parses a `GeoJSON` document that must be a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`ClientError::Geometry`] if the text is not valid `GeoJSON`
/// or is a bare geometry or single feature.
pub fn parse_feature_collection(body: &str) -> Result<FeatureCollection, ClientError> {
    let geojson: GeoJson = body.parse().map_err(|e| ClientError::Geometry {
        message: format!("Failed to parse GeoJSON response: {e}"),
    })?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => Err(ClientError::Geometry {
            message: "Expected a FeatureCollection, got a single Feature".to_string(),
        }),
        GeoJson::Geometry(_) => Err(ClientError::Geometry {
            message: "Expected a FeatureCollection, got a bare Geometry".to_string(),
        }),
    }
}

#[async_trait::async_trait]
impl StatsProvider for DashboardClient {
    async fn summary(&self) -> Result<DashboardSummary, ClientError> {
        self.get_enveloped(&self.config.endpoints.summary, &[]).await
    }

    async fn states(&self) -> Result<Vec<StateStat>, ClientError> {
        self.get_enveloped(&self.config.endpoints.states, &[]).await
    }

    async fn state_detail(&self, state: &str) -> Result<StateStat, ClientError> {
        self.get_enveloped(&self.config.endpoints.state, &[("state", state)])
            .await
    }

    async fn state_districts(&self, state: &str) -> Result<StateDistricts, ClientError> {
        self.get_enveloped(&self.config.endpoints.state_districts, &[("state", state)])
            .await
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for DashboardClient {
    async fn analysis_report(&self) -> Result<AnalysisReport, ClientError> {
        self.get_enveloped(&self.config.endpoints.analysis_report, &[])
            .await
    }
}

#[async_trait::async_trait]
impl PredictionProvider for DashboardClient {
    async fn prediction_states(&self) -> Result<Vec<String>, ClientError> {
        self.get_enveloped(&self.config.endpoints.prediction_states, &[])
            .await
    }

    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, ClientError> {
        self.post_enveloped(&self.config.endpoints.predict, request, self.config.retry)
            .await
    }
}

#[async_trait::async_trait]
impl PolicyProvider for DashboardClient {
    async fn policy_recommendations(&self) -> Result<PolicyRecommendations, ClientError> {
        self.get_enveloped(&self.config.endpoints.policy_recommendations, &[])
            .await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        let once = RetryPolicy {
            max_retries: 0,
            ..self.config.retry
        };
        let task: Task = self
            .post_enveloped(&self.config.endpoints.tasks, draft, once)
            .await?;
        log::info!("Created task {} '{}'", task.id, task.title);
        Ok(task)
    }
}

#[async_trait::async_trait]
impl GeometryProvider for DashboardClient {
    async fn feature_collection(&self) -> Result<FeatureCollection, ClientError> {
        let url = &self.config.geometry_url;
        log::info!("Fetching state boundaries from {url}");
        let body = retry::send_text(|| self.http.get(url), self.config.retry).await?;
        let collection = parse_feature_collection(&body)?;
        log::info!("Loaded {} boundary features", collection.features.len());
        Ok(collection)
    }
}
