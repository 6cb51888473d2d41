//! Policy recommendations page.

use std::sync::{Arc, Mutex, PoisonError};

use anomaly_atlas_client::ClientError;
use anomaly_atlas_client::provider::PolicyProvider;
use anomaly_atlas_dashboard_models::analysis::RiskLevel;
use anomaly_atlas_dashboard_models::policy::{PolicyRecommendation, Task, TaskDraft};

use crate::format::format_number;
use crate::notify::{Notification, Notifications};

/// Shown when no policy passes the severity filter.
pub const NO_POLICIES: &str = "No policies match the selected severity";

/// One policy card in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyCard {
    pub id: u64,
    pub title: String,
    pub severity: RiskLevel,
    pub reason: String,
    pub executor: String,
    /// e.g. `"625.0K records"`
    pub impact: String,
}

impl PolicyCard {
    #[must_use]
    pub fn from_policy(policy: &PolicyRecommendation) -> Self {
        Self {
            id: policy.id,
            title: policy.title.clone(),
            severity: policy.severity,
            reason: policy.reason.clone(),
            executor: policy.executor.clone(),
            impact: format!("{} records", format_number(policy.estimated_impact)),
        }
    }
}

/// Counts over every loaded policy, ignoring the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyStats {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

impl PolicyStats {
    #[must_use]
    pub fn of(policies: &[PolicyRecommendation]) -> Self {
        let count = |level: RiskLevel| policies.iter().filter(|p| p.severity == level).count();
        Self {
            total: policies.len(),
            critical: count(RiskLevel::Critical),
            high: count(RiskLevel::High),
            medium: count(RiskLevel::Medium),
        }
    }
}

/// Full description of one policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDetail {
    pub card: PolicyCard,
    pub steps: Vec<String>,
    pub expected_outcome: String,
}

/// Loads policy recommendations and turns them into tasks.
pub struct PolicyView {
    provider: Arc<dyn PolicyProvider>,
    policies: Mutex<Option<Arc<Vec<PolicyRecommendation>>>>,
    filter: Mutex<Option<RiskLevel>>,
    notifications: Notifications,
}

impl PolicyView {
    #[must_use]
    pub fn new(provider: Arc<dyn PolicyProvider>) -> Self {
        Self {
            provider,
            policies: Mutex::new(None),
            filter: Mutex::new(None),
            notifications: Notifications::default(),
        }
    }

    fn report(&self, context: &str, e: &ClientError) {
        log::error!("{context}: {e}");
        self.notifications
            .push(Notification::error(format!("{context}: {e}")));
    }

    fn snapshot(&self) -> Arc<Vec<PolicyRecommendation>> {
        self.policies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    /// Fetches the recommendations and replaces the loaded list.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] after logging it and queueing a
    /// notification. The previous list is kept.
    pub async fn load(&self) -> Result<PolicyStats, ClientError> {
        let loaded = match self.provider.policy_recommendations().await {
            Ok(loaded) => loaded,
            Err(e) => {
                self.report("Failed to load policies", &e);
                return Err(e);
            }
        };

        if loaded.total != loaded.recommendations.len() {
            log::warn!(
                "Policy total {} disagrees with {} recommendations",
                loaded.total,
                loaded.recommendations.len()
            );
        }
        let stats = PolicyStats::of(&loaded.recommendations);
        log::info!(
            "Loaded {} policies ({} critical)",
            stats.total,
            stats.critical
        );
        *self.policies.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::new(loaded.recommendations));
        Ok(stats)
    }

    /// Shows only policies of `severity`; `None` shows all.
    pub fn set_filter(&self, severity: Option<RiskLevel>) {
        *self.filter.lock().unwrap_or_else(PoisonError::into_inner) = severity;
    }

    #[must_use]
    pub fn filter(&self) -> Option<RiskLevel> {
        *self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cards passing the current filter, in server order.
    #[must_use]
    pub fn visible(&self) -> Vec<PolicyCard> {
        let filter = self.filter();
        self.snapshot()
            .iter()
            .filter(|p| filter.is_none_or(|level| p.severity == level))
            .map(PolicyCard::from_policy)
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> PolicyStats {
        PolicyStats::of(&self.snapshot())
    }

    #[must_use]
    pub fn detail(&self, id: u64) -> Option<PolicyDetail> {
        let policies = self.snapshot();
        let policy = policies.iter().find(|p| p.id == id)?;
        Some(PolicyDetail {
            card: PolicyCard::from_policy(policy),
            steps: policy.steps.clone(),
            expected_outcome: policy.expected_outcome.clone(),
        })
    }

    /// Creates a task implementing a loaded policy.
    ///
    /// Returns `None` for an unknown id or a failed request; a failure is
    /// reported as a notification, a success as an info notification.
    pub async fn create_task(&self, id: u64) -> Option<Task> {
        let policies = self.snapshot();
        let Some(policy) = policies.iter().find(|p| p.id == id) else {
            log::warn!("No loaded policy with id {id}");
            return None;
        };

        let draft = TaskDraft::for_policy(policy);
        match self.provider.create_task(&draft).await {
            Ok(task) => {
                self.notifications.push(Notification::info(format!(
                    "Created task #{}: {}",
                    task.id, task.title
                )));
                Some(task)
            }
            Err(e) => {
                self.report(&format!("Failed to create task for '{}'", policy.title), &e);
                None
            }
        }
    }

    #[must_use]
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.notifications.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use anomaly_atlas_dashboard_models::policy::PolicyRecommendations;
    use serde_json::json;

    use crate::notify::NotificationLevel;

    fn policy(id: u64, title: &str, severity: &str, impact: u64) -> PolicyRecommendation {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "severity": severity,
            "reason": format!("{title} is needed"),
            "steps": ["Audit", "Fix"],
            "executor": "District Operator",
            "expected_outcome": "Fewer anomalies",
            "estimated_impact": impact
        }))
        .unwrap()
    }

    #[derive(Default)]
    struct FakePolicies {
        fail: AtomicBool,
        drafts: Mutex<Vec<TaskDraft>>,
    }

    #[async_trait::async_trait]
    impl PolicyProvider for FakePolicies {
        async fn policy_recommendations(&self) -> Result<PolicyRecommendations, ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Protocol {
                    message: "engine offline".to_string(),
                });
            }
            let recommendations = vec![
                policy(1, "PIN Code Validation", "critical", 625_000),
                policy(2, "Duplicate Merge", "high", 48_000),
                policy(3, "DOB Backfill", "medium", 900),
                policy(4, "Operator Retraining", "critical", 12_000),
            ];
            Ok(PolicyRecommendations {
                total: recommendations.len(),
                recommendations,
            })
        }

        async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Protocol {
                    message: "Title is required".to_string(),
                });
            }
            self.drafts.lock().unwrap().push(draft.clone());
            Ok(serde_json::from_value(json!({
                "id": 31,
                "title": draft.title,
                "description": draft.description,
                "status": "pending",
                "priority": draft.priority.map(|p| p.to_string()),
            }))
            .unwrap())
        }
    }

    async fn loaded() -> (PolicyView, Arc<FakePolicies>) {
        let provider = Arc::new(FakePolicies::default());
        let view = PolicyView::new(provider.clone());
        view.load().await.unwrap();
        (view, provider)
    }

    #[tokio::test]
    async fn stats_count_every_policy() {
        let (view, _) = loaded().await;
        assert_eq!(
            view.stats(),
            PolicyStats {
                total: 4,
                critical: 2,
                high: 1,
                medium: 1
            }
        );
    }

    #[tokio::test]
    async fn filter_limits_visible_cards_but_not_stats() {
        let (view, _) = loaded().await;
        assert_eq!(view.visible().len(), 4);

        view.set_filter(Some(RiskLevel::Critical));
        let ids: Vec<u64> = view.visible().iter().map(|c| c.id).collect();
        assert_eq!(ids, [1, 4]);
        assert_eq!(view.stats().total, 4);

        view.set_filter(Some(RiskLevel::Low));
        assert!(view.visible().is_empty());

        view.set_filter(None);
        assert_eq!(view.visible()[0].impact, "625.0K records");
    }

    #[tokio::test]
    async fn detail_lists_steps() {
        let (view, _) = loaded().await;
        let detail = view.detail(3).unwrap();
        assert_eq!(detail.card.title, "DOB Backfill");
        assert_eq!(detail.card.impact, "900 records");
        assert_eq!(detail.steps, ["Audit", "Fix"]);
        assert!(view.detail(99).is_none());
    }

    #[tokio::test]
    async fn create_task_sends_policy_draft() {
        let (view, provider) = loaded().await;
        let task = view.create_task(2).await.unwrap();

        assert_eq!(task.title, "Implement: Duplicate Merge");
        let drafts = provider.drafts.lock().unwrap().clone();
        assert_eq!(drafts[0].priority, Some(RiskLevel::High));
        let notes = view.take_notifications();
        assert_eq!(notes[0].level, NotificationLevel::Info);
        assert!(notes[0].message.contains("#31"));

        assert!(view.create_task(99).await.is_none());
        assert_eq!(provider.drafts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failures_keep_loaded_policies() {
        let (view, provider) = loaded().await;
        provider.fail.store(true, Ordering::SeqCst);

        assert!(view.load().await.is_err());
        assert!(view.create_task(1).await.is_none());
        assert_eq!(view.stats().total, 4);

        let notes = view.take_notifications();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.level == NotificationLevel::Error));
    }
}
