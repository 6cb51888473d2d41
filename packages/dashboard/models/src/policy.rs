//! Types for policy recommendations and the task list they feed.

use serde::{Deserialize, Serialize};

use crate::analysis::RiskLevel;

/// A recommended remediation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecommendation {
    /// Server identifier.
    pub id: u64,
    /// Short title.
    pub title: String,
    /// Urgency (`critical`, `high`, `medium`, `low`).
    pub severity: RiskLevel,
    /// Why the policy is recommended.
    pub reason: String,
    /// Implementation steps, in order.
    #[serde(default)]
    pub steps: Vec<String>,
    /// Who carries the policy out.
    pub executor: String,
    /// What success looks like.
    pub expected_outcome: String,
    /// Records the policy would touch.
    pub estimated_impact: u64,
}

/// Payload of the recommendations endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecommendations {
    /// Recommendations, most urgent first.
    pub recommendations: Vec<PolicyRecommendation>,
    /// Number of recommendations.
    pub total: usize,
}

/// Body for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Server default (`medium`) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TaskDraft {
    /// Task that implements a policy.
    #[must_use]
    pub fn for_policy(policy: &PolicyRecommendation) -> Self {
        Self {
            title: format!("Implement: {}", policy.title),
            description: policy.reason.clone(),
            priority: Some(policy.severity),
            state: None,
        }
    }
}

/// A task as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `pending`, `in_progress` or `done`.
    pub status: String,
    pub priority: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub anomaly_type: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// ISO 8601, no offset.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PolicyRecommendation {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "PIN Code Validation & Correction",
            "severity": "critical",
            "reason": "12.5% of records have invalid PIN codes",
            "steps": ["Export mismatches", "Cross-reference PIN database"],
            "executor": "System + Operator",
            "expected_outcome": "95% PIN code accuracy improvement",
            "estimated_impact": 625_000
        }))
        .unwrap()
    }

    #[test]
    fn parses_recommendation() {
        let policy = policy();
        assert_eq!(policy.severity, RiskLevel::Critical);
        assert_eq!(policy.steps.len(), 2);
    }

    #[test]
    fn task_draft_names_the_policy() {
        let draft = TaskDraft::for_policy(&policy());
        assert_eq!(draft.title, "Implement: PIN Code Validation & Correction");
        assert_eq!(draft.description, "12.5% of records have invalid PIN codes");

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["priority"], "critical");
        assert!(body.get("state").is_none());
    }

    #[test]
    fn parses_created_task() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Implement: PIN Code Validation & Correction",
            "description": "12.5% of records have invalid PIN codes",
            "status": "pending",
            "priority": "critical",
            "state": null,
            "anomaly_type": null,
            "assigned_to": null,
            "created_at": "2026-02-01T09:30:00",
            "updated_at": "2026-02-01T09:30:00"
        }))
        .unwrap();
        assert_eq!(task.id, 7);
        assert!(task.state.is_none());
    }
}
