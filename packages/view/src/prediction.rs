//! Risk prediction form.
//!
//! The form is validated locally, forwarded to the dashboard API, and the
//! scored result is turned into a [`PredictionCard`].

use std::sync::{Arc, Mutex, PoisonError};

use anomaly_atlas_client::ClientError;
use anomaly_atlas_client::provider::PredictionProvider;
use anomaly_atlas_dashboard_models::prediction::{PredictionRequest, PredictionResult};

use crate::notify::{Notification, Notifications};
use crate::severity::SeverityTier;

/// Gauge tier for a 0-1 risk score.
#[must_use]
pub fn score_tier(score: f64) -> SeverityTier {
    if score < 0.4 {
        SeverityTier::Success
    } else if score < 0.7 {
        SeverityTier::Warning
    } else {
        SeverityTier::Alert
    }
}

/// Badge tier for a risk label such as `"Medium Risk Zone"`.
#[must_use]
pub fn label_tier(prediction: &str) -> SeverityTier {
    if prediction.contains("Low") {
        SeverityTier::Success
    } else if prediction.contains("Medium") {
        SeverityTier::Warning
    } else {
        SeverityTier::Alert
    }
}

/// A scored prediction, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionCard {
    pub state: String,
    pub label: String,
    pub label_tier: SeverityTier,
    /// Score out of 100, e.g. `"52"`.
    pub score: String,
    pub score_tier: SeverityTier,
    pub confidence: String,
    pub recommended_action: String,
    /// `(feature, display value)`
    pub features: Vec<(String, String)>,
}

impl PredictionCard {
    #[must_use]
    pub fn from_result(result: &PredictionResult) -> Self {
        Self {
            state: result.state.clone(),
            label: result.prediction.clone(),
            label_tier: label_tier(&result.prediction),
            score: format!("{:.0}", result.score * 100.0),
            score_tier: score_tier(result.score),
            confidence: format!("{:.0}%", result.confidence * 100.0),
            recommended_action: result.recommended_action.clone(),
            features: result
                .top_features
                .iter()
                .map(|f| {
                    let value = f
                        .value
                        .clone()
                        .unwrap_or_else(|| format!("{}%", f.contribution));
                    (f.feature.clone(), value)
                })
                .collect(),
        }
    }
}

/// Holds the prediction form's state list.
pub struct PredictionView {
    provider: Arc<dyn PredictionProvider>,
    states: Mutex<Vec<String>>,
    notifications: Notifications,
}

impl PredictionView {
    #[must_use]
    pub fn new(provider: Arc<dyn PredictionProvider>) -> Self {
        Self {
            provider,
            states: Mutex::new(Vec::new()),
            notifications: Notifications::default(),
        }
    }

    /// Fetches the states the form offers.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] after logging it and queueing a
    /// notification. The previous list is kept.
    pub async fn load_states(&self) -> Result<Vec<String>, ClientError> {
        match self.provider.prediction_states().await {
            Ok(states) => {
                log::info!("Loaded {} prediction states", states.len());
                *self.states.lock().unwrap_or_else(PoisonError::into_inner) = states.clone();
                Ok(states)
            }
            Err(e) => {
                log::error!("Failed to load prediction states: {e}");
                self.notifications.push(Notification::error(format!(
                    "Failed to load prediction states: {e}"
                )));
                Err(e)
            }
        }
    }

    /// Validates and submits the form.
    ///
    /// Returns `None` when the form is invalid (nothing is sent) or the
    /// request fails; either way a notification is queued.
    pub async fn predict(&self, request: &PredictionRequest) -> Option<PredictionCard> {
        if let Err(e) = request.validate() {
            log::warn!("{e}");
            self.notifications.push(Notification::warning(e.to_string()));
            return None;
        }

        log::debug!("Requesting prediction for {}", request.state);
        let result = match self.provider.predict(request).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Failed to get prediction: {e}");
                self.notifications
                    .push(Notification::error(format!("Failed to get prediction: {e}")));
                return None;
            }
        };

        let card = PredictionCard::from_result(&result);
        log::info!(
            "Prediction for {}: {} (score {})",
            card.state,
            card.label,
            card.score
        );
        Some(card)
    }

    #[must_use]
    pub fn states(&self) -> Vec<String> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.notifications.take()
    }
}
