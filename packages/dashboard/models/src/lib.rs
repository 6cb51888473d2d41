#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard API response types.
//!
//! Every endpoint of the dashboard API wraps its payload in an
//! [`ApiEnvelope`]. The types here mirror the `data` field of each
//! endpoint and are shared by the HTTP client and the view layer. They
//! carry no presentation logic; severity and rates are computed
//! server-side and only read here.

pub mod analysis;
pub mod policy;
pub mod prediction;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Server-assigned anomaly severity for a state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Few anomalies relative to peers.
    Low,
    /// Elevated anomaly volume.
    Medium,
    /// Anomaly volume that needs attention.
    High,
}

/// Response wrapper used by every dashboard endpoint.
///
/// `{ "success": true, "data": ... }` on success,
/// `{ "success": false, "error": "..." }` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    /// Whether the server handled the request.
    pub success: bool,
    /// Payload, present when `success` is true.
    #[serde(default)]
    pub data: Option<T>,
    /// Server error message, present when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] if the server reported failure or the
    /// payload is missing.
    pub fn into_data(self) -> Result<T, EnvelopeError> {
        if !self.success {
            return Err(EnvelopeError {
                message: self
                    .error
                    .unwrap_or_else(|| "server reported failure without a message".to_string()),
            });
        }
        self.data.ok_or_else(|| EnvelopeError {
            message: "response is missing the data field".to_string(),
        })
    }
}

/// Error returned when an [`ApiEnvelope`] carries no usable payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeError {
    /// Server-provided or synthesized reason.
    pub message: String,
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EnvelopeError {}

/// Count of one anomaly type within a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyTypeCount {
    /// Anomaly type label (e.g. "Invalid PIN Code").
    #[serde(rename = "type")]
    pub anomaly_type: String,
    /// Number of records flagged with this type.
    pub count: u64,
}

/// Record volume for one district of a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRecords {
    /// District name.
    pub district: String,
    /// Total records in the district.
    pub records: u64,
    /// Anomalous records in the district, when the server reports them.
    #[serde(default)]
    pub anomalies: Option<u64>,
}

/// Aggregated anomaly statistics for one state.
///
/// The states endpoint returns the summary fields only; the state-detail
/// endpoint fills the rates and both breakdown lists but omits
/// `severity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateStat {
    /// Canonical display name (unique, case-insensitively).
    pub state: String,
    /// Total records in the state.
    pub total_records: u64,
    /// Anomalous records in the state.
    pub total_anomalies: u64,
    /// Percentage of records flagged, 0-100.
    pub anomaly_rate: f64,
    /// Severity tier computed by the server.
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Fraction of records with an invalid PIN code, 0-1.
    #[serde(default)]
    pub invalid_pin_rate: Option<f64>,
    /// Fraction of duplicate records, 0-1.
    #[serde(default)]
    pub duplicate_rate: Option<f64>,
    /// Fraction of records missing a date of birth, 0-1.
    #[serde(default)]
    pub missing_dob_rate: Option<f64>,
    /// Most frequent anomaly types, in server order.
    #[serde(default)]
    pub top_anomaly_types: Vec<AnomalyTypeCount>,
    /// Per-district record volumes, in server order.
    #[serde(default)]
    pub district_distribution: Vec<DistrictRecords>,
}

impl StateStat {
    /// Checks the numeric invariants of the record.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateStat`] describing the first violated
    /// invariant.
    pub fn validate(&self) -> Result<(), InvalidStateStat> {
        let fail = |reason: String| {
            Err(InvalidStateStat {
                state: self.state.clone(),
                reason,
            })
        };

        if self.state.trim().is_empty() {
            return fail("state name is empty".to_string());
        }
        if self.total_anomalies > self.total_records {
            return fail(format!(
                "total_anomalies {} exceeds total_records {}",
                self.total_anomalies, self.total_records
            ));
        }
        if !(0.0..=100.0).contains(&self.anomaly_rate) {
            return fail(format!("anomaly_rate {} outside 0-100", self.anomaly_rate));
        }
        for (field, value) in [
            ("invalid_pin_rate", self.invalid_pin_rate),
            ("duplicate_rate", self.duplicate_rate),
            ("missing_dob_rate", self.missing_dob_rate),
        ] {
            if let Some(v) = value
                && !(0.0..=1.0).contains(&v)
            {
                return fail(format!("{field} {v} outside 0-1"));
            }
        }

        Ok(())
    }
}

/// Error returned by [`StateStat::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStateStat {
    /// State the record belongs to.
    pub state: String,
    /// Which invariant failed.
    pub reason: String,
}

impl std::fmt::Display for InvalidStateStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid statistics for '{}': {}", self.state, self.reason)
    }
}

impl std::error::Error for InvalidStateStat {}

/// A state ranked by anomaly volume on the summary endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedState {
    /// State display name.
    pub state: String,
    /// Anomalies recorded for the state.
    pub anomaly_count: u64,
}

/// National summary returned by the summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Total records across all states.
    pub total_records: u64,
    /// Total anomalous records.
    pub total_anomalies: u64,
    /// Percentage of records flagged, 0-100.
    pub anomaly_rate: f64,
    /// Anomalies that were fixed and verified.
    pub verified_fixed: u64,
    /// Anomalies still awaiting verification.
    pub pending_verification: u64,
    /// States with the most anomalies, highest first.
    #[serde(default)]
    pub most_affected_states: Vec<AffectedState>,
    /// Server timestamp of the aggregation (ISO 8601, no offset).
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl DashboardSummary {
    /// Share of anomalies fixed and verified, as a percentage in 0-100.
    ///
    /// Zero when there are no anomalies.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fix_progress_percent(&self) -> f64 {
        if self.total_anomalies == 0 {
            return 0.0;
        }
        (self.verified_fixed as f64 / self.total_anomalies as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// District-only breakdown for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDistricts {
    /// State display name as echoed by the server.
    pub state: String,
    /// Per-district record volumes.
    pub districts: Vec<DistrictRecords>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(state: &str) -> StateStat {
        StateStat {
            state: state.to_string(),
            total_records: 1000,
            total_anomalies: 100,
            anomaly_rate: 10.0,
            severity: Some(Severity::Medium),
            invalid_pin_rate: None,
            duplicate_rate: None,
            missing_dob_rate: None,
            top_anomaly_types: Vec::new(),
            district_distribution: Vec::new(),
        }
    }

    #[test]
    fn parses_states_listing_entry() {
        let body = serde_json::json!({
            "state": "Bihar",
            "total_records": 412_000,
            "total_anomalies": 45_210,
            "anomaly_rate": 10.97,
            "severity": "high"
        });
        let parsed: StateStat = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.severity, Some(Severity::High));
        assert!(parsed.district_distribution.is_empty());
        assert!(parsed.invalid_pin_rate.is_none());
    }

    #[test]
    fn parses_state_detail_without_severity() {
        let body = serde_json::json!({
            "state": "Kerala",
            "total_records": 200_000,
            "total_anomalies": 8_000,
            "anomaly_rate": 4.0,
            "top_anomaly_types": [
                {"type": "Missing DOB", "count": 3000},
                {"type": "Invalid PIN Code", "count": 1200}
            ],
            "district_distribution": [
                {"district": "Kochi", "records": 50_000, "anomalies": 900},
                {"district": "Kollam", "records": 30_000}
            ],
            "invalid_pin_rate": 0.052,
            "duplicate_rate": 0.011,
            "missing_dob_rate": 0.02
        });
        let parsed: StateStat = serde_json::from_value(body).unwrap();
        assert!(parsed.severity.is_none());
        assert_eq!(parsed.top_anomaly_types[0].anomaly_type, "Missing DOB");
        assert_eq!(parsed.district_distribution[1].anomalies, None);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!(Severity::Medium.to_string(), "medium");
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn envelope_success_yields_data() {
        let body = serde_json::json!({"success": true, "data": [1, 2, 3]});
        let envelope: ApiEnvelope<Vec<u32>> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.into_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn envelope_failure_carries_server_message() {
        let body = serde_json::json!({"success": false, "error": "State parameter is required"});
        let envelope: ApiEnvelope<StateStat> = serde_json::from_value(body).unwrap();
        let err = envelope.into_data().unwrap_err();
        assert_eq!(err.message, "State parameter is required");
    }

    #[test]
    fn envelope_success_without_data_is_an_error() {
        let body = serde_json::json!({"success": true});
        let envelope: ApiEnvelope<StateStat> = serde_json::from_value(body).unwrap();
        assert!(envelope.into_data().is_err());
    }

    #[test]
    fn validate_rejects_more_anomalies_than_records() {
        let mut s = stat("Goa");
        s.total_anomalies = 2000;
        let err = s.validate().unwrap_err();
        assert!(err.reason.contains("exceeds"), "{err}");
    }

    #[test]
    fn validate_rejects_fractional_rate_out_of_range() {
        let mut s = stat("Goa");
        s.duplicate_rate = Some(1.5);
        assert!(s.validate().is_err());
    }

    #[test]
    fn fix_progress_from_verified_share() {
        let summary: DashboardSummary = serde_json::from_value(serde_json::json!({
            "total_records": 1000,
            "total_anomalies": 100,
            "anomaly_rate": 10.0,
            "verified_fixed": 40,
            "pending_verification": 60,
            "most_affected_states": [{"state": "Bihar", "anomaly_count": 45}]
        }))
        .unwrap();
        assert!((summary.fix_progress_percent() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fix_progress_is_zero_without_anomalies() {
        let summary = DashboardSummary {
            total_records: 10,
            total_anomalies: 0,
            anomaly_rate: 0.0,
            verified_fixed: 0,
            pending_verification: 0,
            most_affected_states: Vec::new(),
            last_updated: None,
        };
        assert!(summary.fix_progress_percent().abs() < f64::EPSILON);
    }
}
