//! Provider traits consumed by the view layer.
//!
//! [`crate::DashboardClient`] implements all of them. Tests and
//! alternative front ends can substitute their own implementations.

use anomaly_atlas_dashboard_models::analysis::AnalysisReport;
use anomaly_atlas_dashboard_models::policy::{PolicyRecommendations, Task, TaskDraft};
use anomaly_atlas_dashboard_models::prediction::{PredictionRequest, PredictionResult};
use anomaly_atlas_dashboard_models::{DashboardSummary, StateDistricts, StateStat};
use geojson::FeatureCollection;

use crate::ClientError;

/// Source of dashboard statistics.
#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    /// National summary.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn summary(&self) -> Result<DashboardSummary, ClientError>;

    /// Summary record for every state (no district or anomaly-type
    /// breakdowns).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn states(&self) -> Result<Vec<StateStat>, ClientError>;

    /// Full record for one state, including rates and breakdowns.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn state_detail(&self, state: &str) -> Result<StateStat, ClientError>;

    /// District breakdown for one state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn state_districts(&self, state: &str) -> Result<StateDistricts, ClientError>;
}

/// Source of the analysis report.
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Full analysis report.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn analysis_report(&self) -> Result<AnalysisReport, ClientError>;
}

/// Forwards the risk prediction form.
#[async_trait::async_trait]
pub trait PredictionProvider: Send + Sync {
    /// States offered by the form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn prediction_states(&self) -> Result<Vec<String>, ClientError>;

    /// Scores the submitted figures.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails. A request
    /// the server rejects surfaces as [`ClientError::Protocol`].
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, ClientError>;
}

/// Source of policy recommendations and sink for the tasks they create.
#[async_trait::async_trait]
pub trait PolicyProvider: Send + Sync {
    /// Every recommendation, most urgent first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn policy_recommendations(&self) -> Result<PolicyRecommendations, ClientError>;

    /// Creates a task. Never retried, so a timeout may leave the task
    /// created server-side.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or envelope fails.
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError>;
}

/// Source of state boundary geometry.
#[async_trait::async_trait]
pub trait GeometryProvider: Send + Sync {
    /// Every state boundary as a `GeoJSON` `FeatureCollection`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the body is not a
    /// `FeatureCollection`.
    async fn feature_collection(&self) -> Result<FeatureCollection, ClientError>;
}
