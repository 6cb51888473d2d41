//! Types for the risk prediction endpoints.
//!
//! The prediction form is forwarded as-is; scoring happens server-side.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Body of a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// State the figures belong to.
    pub state: String,
    /// Total records.
    pub records: u64,
    /// Anomalous records.
    pub anomalies: u64,
    /// Fraction of records with an invalid PIN code, 0-1.
    #[serde(default)]
    pub invalid_pin_rate: f64,
    /// Fraction of duplicate records, 0-1.
    #[serde(default)]
    pub duplicate_rate: f64,
    /// Fraction of records missing a date of birth, 0-1.
    #[serde(default)]
    pub missing_dob_rate: f64,
}

impl PredictionRequest {
    /// Checks the form before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPredictionRequest`] describing the first problem.
    pub fn validate(&self) -> Result<(), InvalidPredictionRequest> {
        let fail = |reason: String| Err(InvalidPredictionRequest { reason });

        if self.state.trim().is_empty() {
            return fail("a state is required".to_string());
        }
        if self.records == 0 {
            return fail("records must be greater than zero".to_string());
        }
        if self.anomalies > self.records {
            return fail(format!(
                "anomalies {} exceeds records {}",
                self.anomalies, self.records
            ));
        }
        for (field, value) in [
            ("invalid_pin_rate", self.invalid_pin_rate),
            ("duplicate_rate", self.duplicate_rate),
            ("missing_dob_rate", self.missing_dob_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return fail(format!("{field} {value} outside 0-1"));
            }
        }

        Ok(())
    }
}

/// Error returned by [`PredictionRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPredictionRequest {
    /// Which check failed.
    pub reason: String,
}

impl std::fmt::Display for InvalidPredictionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid prediction request: {}", self.reason)
    }
}

impl std::error::Error for InvalidPredictionRequest {}

/// Canned form values for a quick demonstration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExamplePreset {
    Low,
    Medium,
    High,
}

impl ExamplePreset {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Form values for this preset.
    #[must_use]
    pub fn request(self) -> PredictionRequest {
        let (state, records, anomalies, invalid_pin_rate, duplicate_rate, missing_dob_rate) =
            match self {
                Self::Low => ("Kerala", 50_000, 800, 0.02, 0.01, 0.01),
                Self::Medium => ("Maharashtra", 120_000, 6_000, 0.08, 0.04, 0.03),
                Self::High => ("Bihar", 80_000, 12_000, 0.18, 0.12, 0.08),
            };
        PredictionRequest {
            state: state.to_string(),
            records,
            anomalies,
            invalid_pin_rate,
            duplicate_rate,
            missing_dob_rate,
        }
    }
}

/// One feature's share of a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    /// Feature label (e.g. "Invalid PIN Rate").
    pub feature: String,
    /// Display value chosen by the server, when present.
    #[serde(default)]
    pub value: Option<String>,
    /// Contribution in percent.
    pub contribution: f64,
}

/// Server response to a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Risk label, e.g. "High Risk Zone".
    pub prediction: String,
    /// Risk score, 0-1.
    pub score: f64,
    /// Model confidence, 0-1.
    pub confidence: f64,
    /// Suggested next step.
    pub recommended_action: String,
    /// Strongest contributing features, highest first.
    #[serde(default)]
    pub top_features: Vec<FeatureContribution>,
    /// State echoed by the server.
    pub state: String,
    /// `"rule_based"` or `"ml_model"`.
    #[serde(default)]
    pub model_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid_requests() {
        for preset in ExamplePreset::ALL {
            assert!(preset.request().validate().is_ok(), "{preset}");
        }
        assert_eq!(ExamplePreset::High.request().state, "Bihar");
        assert_eq!("MEDIUM".parse::<ExamplePreset>().unwrap(), ExamplePreset::Medium);
    }

    #[test]
    fn rejects_blank_state_and_excess_anomalies() {
        let mut request = ExamplePreset::Low.request();
        request.state = "  ".to_string();
        assert!(request.validate().unwrap_err().reason.contains("state"));

        let mut request = ExamplePreset::Low.request();
        request.anomalies = request.records + 1;
        assert!(request.validate().unwrap_err().reason.contains("exceeds"));

        let mut request = ExamplePreset::Low.request();
        request.duplicate_rate = 12.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn parses_result_with_and_without_feature_values() {
        let result: PredictionResult = serde_json::from_value(serde_json::json!({
            "prediction": "Medium Risk Zone",
            "score": 0.52,
            "confidence": 0.78,
            "recommended_action": "Schedule verification within 7 days.",
            "top_features": [
                {"feature": "Invalid PIN Rate", "value": "8.0%", "contribution": 8.0},
                {"feature": "General Assessment", "contribution": 100}
            ],
            "state": "Maharashtra",
            "model_type": "rule_based"
        }))
        .unwrap();
        assert_eq!(result.top_features[0].value.as_deref(), Some("8.0%"));
        assert!(result.top_features[1].value.is_none());
    }
}
