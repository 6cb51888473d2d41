//! Types for the analysis report endpoint.
//!
//! The report carries several labelled distributions as JSON objects
//! whose key order is meaningful (age buckets, for example), so they are
//! deserialized into ordered [`LabeledCount`] lists rather than maps.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{AnomalyTypeCount, Severity};

/// Risk level attached to a suspicious pattern.
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
pub enum RiskLevel {
    /// Low risk.
    Low,
    /// Medium risk.
    Medium,
    /// High risk.
    High,
    /// Needs immediate action.
    Critical,
}

/// A label and its count, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledCount {
    /// Bucket label (e.g. "18-30", "Female").
    pub label: String,
    /// Number of records in the bucket.
    pub count: u64,
}

/// A correlation between two anomaly types flagged by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationWarning {
    /// Human-readable description.
    pub warning: String,
    /// Correlation coefficient, 0-1.
    pub correlation: f64,
    /// How serious the server considers the correlation.
    pub severity: Severity,
}

/// Anomaly volume for one state in the analysis report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAnomalyCount {
    /// State display name.
    pub state: String,
    /// Anomalies recorded for the state.
    pub anomalies: u64,
}

/// A suspicious enrollment pattern detected server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousPattern {
    /// Description of the pattern.
    pub pattern: String,
    /// Number of records involved.
    pub affected_records: u64,
    /// Risk classification.
    pub risk_level: RiskLevel,
}

/// Full analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Records included in the analysis run.
    pub total_records_analyzed: u64,
    /// When the analysis ran (ISO 8601, no offset).
    pub analysis_date: String,
    /// Records per age bucket, in bucket order.
    #[serde(with = "ordered_counts")]
    pub age_distribution: Vec<LabeledCount>,
    /// Records per gender label, in server order.
    #[serde(with = "ordered_counts")]
    pub gender_distribution: Vec<LabeledCount>,
    /// Anomaly counts per type, highest first.
    #[serde(default)]
    pub anomaly_frequency: Vec<AnomalyTypeCount>,
    /// Correlated anomaly types.
    #[serde(default)]
    pub correlation_warnings: Vec<CorrelationWarning>,
    /// Anomaly counts per state, highest first.
    #[serde(default)]
    pub state_anomaly_distribution: Vec<StateAnomalyCount>,
    /// Suspicious enrollment patterns.
    #[serde(default)]
    pub suspicious_patterns: Vec<SuspiciousPattern>,
}

/// (De)serializes `{ "label": count, ... }` objects as ordered
/// [`LabeledCount`] lists.
mod ordered_counts {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap as _;
    use serde::{Deserializer, Serializer};

    use super::LabeledCount;

    pub fn serialize<S: Serializer>(
        counts: &[LabeledCount],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(counts.len()))?;
        for entry in counts {
            map.serialize_entry(&entry.label, &entry.count)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<LabeledCount>, D::Error> {
        deserializer.deserialize_map(CountsVisitor)
    }

    struct CountsVisitor;

    impl<'de> Visitor<'de> for CountsVisitor {
        type Value = Vec<LabeledCount>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object mapping labels to counts")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut counts = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((label, count)) = access.next_entry::<String, u64>()? {
                counts.push(LabeledCount { label, count });
            }
            Ok(counts)
        }
    }
}
