//! Analysis report page.

use std::sync::{Arc, Mutex, PoisonError};

use anomaly_atlas_client::ClientError;
use anomaly_atlas_client::provider::AnalysisProvider;
use anomaly_atlas_dashboard_models::Severity;
use anomaly_atlas_dashboard_models::analysis::{AnalysisReport, LabeledCount, RiskLevel};

use crate::chart::{ChartKind, ChartSpec};
use crate::format::{format_correlation, format_date, format_number};
use crate::notify::{Notification, Notifications};

/// Anomaly types shown in the frequency chart.
pub const TOP_ANOMALY_TYPES: usize = 8;

const FREQUENCY_COLORS: [&str; 8] = [
    "rgba(239, 68, 68, 0.7)",
    "rgba(234, 88, 12, 0.7)",
    "rgba(245, 158, 11, 0.7)",
    "rgba(217, 119, 6, 0.7)",
    "rgba(101, 163, 13, 0.7)",
    "rgba(16, 185, 129, 0.7)",
    "rgba(59, 130, 246, 0.7)",
    "rgba(139, 92, 246, 0.7)",
];
const AGE_COLOR: &str = "rgba(255, 153, 51, 0.7)";
const GENDER_COLORS: [&str; 4] = ["#3B82F6", "#EC4899", "#8B5CF6", "#6B7280"];
const STATE_COLOR: &str = "rgba(239, 68, 68, 0.7)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningRow {
    pub text: String,
    pub severity: Severity,
    /// e.g. `"Correlation: 87%"`
    pub correlation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRow {
    pub risk_level: RiskLevel,
    pub pattern: String,
    pub affected: String,
}

/// Everything the analysis page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPage {
    pub total_analyzed: String,
    pub analysis_date: String,
    pub anomaly_frequency: ChartSpec,
    pub age_distribution: ChartSpec,
    pub gender_distribution: ChartSpec,
    pub state_anomalies: ChartSpec,
    pub warnings: Vec<WarningRow>,
    pub patterns: Vec<PatternRow>,
    /// Every anomaly type with its formatted count.
    pub anomaly_types: Vec<(String, String)>,
}

fn labeled_chart(
    kind: ChartKind,
    title: &str,
    series_label: &str,
    counts: &[LabeledCount],
    colors: Vec<&'static str>,
) -> ChartSpec {
    ChartSpec {
        kind,
        title: title.to_string(),
        series_label: series_label.to_string(),
        labels: counts.iter().map(|c| c.label.clone()).collect(),
        values: counts.iter().map(|c| c.count).collect(),
        colors,
    }
}

impl AnalysisPage {
    #[must_use]
    pub fn from_report(report: &AnalysisReport) -> Self {
        let top = &report.anomaly_frequency
            [..report.anomaly_frequency.len().min(TOP_ANOMALY_TYPES)];

        Self {
            total_analyzed: format_number(report.total_records_analyzed),
            analysis_date: format_date(&report.analysis_date),
            anomaly_frequency: ChartSpec {
                kind: ChartKind::HorizontalBar,
                title: "Anomaly frequency".to_string(),
                series_label: "Count".to_string(),
                labels: top.iter().map(|a| a.anomaly_type.clone()).collect(),
                values: top.iter().map(|a| a.count).collect(),
                colors: FREQUENCY_COLORS.to_vec(),
            },
            age_distribution: labeled_chart(
                ChartKind::Bar,
                "Age distribution",
                "Population",
                &report.age_distribution,
                vec![AGE_COLOR],
            ),
            gender_distribution: labeled_chart(
                ChartKind::Doughnut,
                "Gender distribution",
                "Population",
                &report.gender_distribution,
                GENDER_COLORS.to_vec(),
            ),
            state_anomalies: ChartSpec {
                kind: ChartKind::Bar,
                title: "Anomalies by state".to_string(),
                series_label: "Anomalies".to_string(),
                labels: report
                    .state_anomaly_distribution
                    .iter()
                    .map(|s| s.state.clone())
                    .collect(),
                values: report
                    .state_anomaly_distribution
                    .iter()
                    .map(|s| s.anomalies)
                    .collect(),
                colors: vec![STATE_COLOR],
            },
            warnings: report
                .correlation_warnings
                .iter()
                .map(|w| WarningRow {
                    text: w.warning.clone(),
                    severity: w.severity,
                    correlation: format!("Correlation: {}", format_correlation(w.correlation)),
                })
                .collect(),
            patterns: report
                .suspicious_patterns
                .iter()
                .map(|p| PatternRow {
                    risk_level: p.risk_level,
                    pattern: p.pattern.clone(),
                    affected: format_number(p.affected_records),
                })
                .collect(),
            anomaly_types: report
                .anomaly_frequency
                .iter()
                .map(|a| (a.anomaly_type.clone(), format_number(a.count)))
                .collect(),
        }
    }

    /// Charts in page order.
    #[must_use]
    pub fn charts(&self) -> [&ChartSpec; 4] {
        [
            &self.anomaly_frequency,
            &self.age_distribution,
            &self.gender_distribution,
            &self.state_anomalies,
        ]
    }
}

/// Loads and holds the analysis page.
pub struct AnalysisView {
    provider: Arc<dyn AnalysisProvider>,
    page: Mutex<Option<Arc<AnalysisPage>>>,
    notifications: Notifications,
}

impl AnalysisView {
    #[must_use]
    pub fn new(provider: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            provider,
            page: Mutex::new(None),
            notifications: Notifications::default(),
        }
    }

    /// Fetches the report and rebuilds the page.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] after logging it and queueing a
    /// notification. The previous page is kept.
    pub async fn load(&self) -> Result<Arc<AnalysisPage>, ClientError> {
        let report = match self.provider.analysis_report().await {
            Ok(report) => report,
            Err(e) => {
                log::error!("Failed to load analysis report: {e}");
                self.notifications.push(Notification::error(format!(
                    "Failed to load analysis report: {e}"
                )));
                return Err(e);
            }
        };

        let page = Arc::new(AnalysisPage::from_report(&report));
        log::info!(
            "Loaded analysis report: {} records, {} warnings, {} patterns",
            page.total_analyzed,
            page.warnings.len(),
            page.patterns.len()
        );
        *self.page.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&page));
        Ok(page)
    }

    #[must_use]
    pub fn page(&self) -> Option<Arc<AnalysisPage>> {
        self.page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.notifications.take()
    }
}
