//! Command implementations shared by the subcommands and the
//! interactive menu.

use std::sync::Arc;

use anomaly_atlas_client::DashboardClient;
use anomaly_atlas_dashboard_models::analysis::RiskLevel;
use anomaly_atlas_dashboard_models::prediction::PredictionRequest;
use anomaly_atlas_view::chart::{ChartSlot, district_chart, district_rows};
use anomaly_atlas_view::effect::{PanelView, SummaryCards, affected_rows};
use anomaly_atlas_view::policy::{NO_POLICIES, PolicyCard};
use anomaly_atlas_view::{
    AnalysisView, PolicyView, PredictionView, SelectOutcome, StateCorrelationView, ViewEffect,
};
use indicatif::MultiProgress;

use crate::progress::with_spinner;
use crate::render::{
    AnalysisSlots, TextChartSurface, print_affected, print_analysis, print_districts,
    print_effects, print_notifications, print_panel, print_policy_cards, print_policy_detail,
    print_policy_stats, print_prediction, print_states, print_summary, print_task,
};

/// Dashboard session: one client, one view per page, one chart surface.
pub struct App {
    view: StateCorrelationView,
    analysis: AnalysisView,
    prediction: PredictionView,
    policies: PolicyView,
    multi: MultiProgress,
    surface: TextChartSurface,
    panel_chart: ChartSlot,
    analysis_charts: AnalysisSlots,
}

impl App {
    #[must_use]
    pub fn new(client: DashboardClient, multi: MultiProgress) -> Self {
        let client = Arc::new(client);
        Self {
            view: StateCorrelationView::new(client.clone(), client.clone()),
            analysis: AnalysisView::new(client.clone()),
            prediction: PredictionView::new(client.clone()),
            policies: PolicyView::new(client),
            multi,
            surface: TextChartSurface::default(),
            panel_chart: ChartSlot::default(),
            analysis_charts: AnalysisSlots::default(),
        }
    }

    fn flush_notifications(&self) {
        print_notifications(&self.view.take_notifications());
        print_notifications(&self.analysis.take_notifications());
        print_notifications(&self.prediction.take_notifications());
        print_notifications(&self.policies.take_notifications());
    }

    /// National summary and most-affected states. A failed reload shows
    /// the previously loaded summary.
    pub async fn summary(&mut self) {
        let _ = with_spinner(&self.multi, "Loading summary...", self.view.load_summary()).await;
        self.flush_notifications();

        match self.view.summary() {
            Some(loaded) => {
                print_summary(&SummaryCards::from_loaded(&loaded));
                print_affected(&affected_rows(&loaded.summary));
            }
            None => println!("No summary loaded"),
        }
    }

    /// Every state with its severity tier.
    pub async fn states(&mut self) {
        let _ = with_spinner(
            &self.multi,
            "Loading state statistics...",
            self.view.load_states(),
        )
        .await;
        self.flush_notifications();

        let table = self.view.states();
        if table.is_empty() {
            println!("No state statistics loaded");
        } else {
            print_states(&table);
        }
    }

    /// Detail panel for one state.
    pub async fn state(&mut self, name: &str) {
        let outcome = with_spinner(
            &self.multi,
            &format!("Loading {name}..."),
            self.view.select_state(name),
        )
        .await;

        match outcome {
            SelectOutcome::Shown | SelectOutcome::Failed => {
                let panel = PanelView::from_state(&self.view.panel());
                print_panel(&panel, &mut self.surface, &mut self.panel_chart);
            }
            SelectOutcome::Ignored => log::warn!("No state name given"),
            SelectOutcome::Superseded => {}
        }
        self.flush_notifications();
    }

    /// District breakdown for one state.
    pub async fn districts(&mut self, name: &str) {
        let result = with_spinner(
            &self.multi,
            &format!("Loading districts for {name}..."),
            self.view.load_districts(name),
        )
        .await;
        self.flush_notifications();

        let Ok(breakdown) = result else {
            return;
        };
        if breakdown.districts.is_empty() {
            println!("No district data for {}", breakdown.state);
            return;
        }
        print_districts(&breakdown.state, &district_rows(&breakdown.districts));
        let chart = district_chart(&breakdown.state, &breakdown.districts);
        self.panel_chart.show(&mut self.surface, &chart);
    }

    /// Map overview: every boundary with its tier and tooltip. With a
    /// point, the state under it is highlighted and selected.
    pub async fn map(&mut self, point: Option<(f64, f64)>) {
        let states = with_spinner(
            &self.multi,
            "Loading state statistics...",
            self.view.load_states(),
        );
        let geometry = with_spinner(
            &self.multi,
            "Downloading state boundaries...",
            self.view.load_geometry(),
        );
        let _ = tokio::join!(states, geometry);

        if self.view.boundaries().is_none() {
            self.flush_notifications();
            return;
        }

        if let Some((lng, lat)) = point {
            match self.view.feature_index_at(lng, lat) {
                Some(index) => {
                    self.view.hover(index);
                    match self.view.selection_name(index) {
                        Some(name) => {
                            self.view.select_state(&name).await;
                        }
                        None => log::warn!("Boundary {index} has no state name"),
                    }
                }
                None => println!("No state boundary contains ({lng}, {lat})"),
            }
        }

        let effects: Vec<ViewEffect> = self.view.render();
        print_effects(&effects, &mut self.surface, &mut self.panel_chart);
        self.view.unhover();
        // print_effects already showed the pending notifications
        let _ = self.view.take_notifications();
    }

    /// Reloads the summary and state statistics.
    pub async fn refresh(&mut self) {
        let ok = with_spinner(&self.multi, "Refreshing...", self.view.refresh()).await;
        if ok {
            println!("Refreshed {} states", self.view.states().len());
        }
        self.flush_notifications();
    }

    /// Clears the state panel.
    pub fn deselect(&mut self) {
        self.view.deselect();
        let panel = PanelView::from_state(&self.view.panel());
        print_panel(&panel, &mut self.surface, &mut self.panel_chart);
    }

    /// Analysis report.
    pub async fn analysis(&mut self) {
        let loaded =
            with_spinner(&self.multi, "Loading analysis report...", self.analysis.load()).await;
        if let Ok(page) = loaded {
            print_analysis(&page, &mut self.surface, &mut self.analysis_charts);
        }
        self.flush_notifications();
    }

    /// States offered by the prediction form, loaded on first use.
    pub async fn prediction_states(&mut self) -> Vec<String> {
        let cached = self.prediction.states();
        if !cached.is_empty() {
            return cached;
        }
        let loaded = with_spinner(
            &self.multi,
            "Loading prediction states...",
            self.prediction.load_states(),
        )
        .await;
        self.flush_notifications();
        loaded.unwrap_or_default()
    }

    /// Submits the prediction form and prints the result.
    pub async fn predict(&mut self, request: &PredictionRequest) {
        let card = with_spinner(
            &self.multi,
            &format!("Predicting risk for {}...", request.state),
            self.prediction.predict(request),
        )
        .await;
        self.flush_notifications();

        if let Some(card) = card {
            print_prediction(&card);
        }
    }

    /// Policy recommendations, optionally limited to one severity.
    /// Returns the cards shown.
    pub async fn policies(&mut self, severity: Option<RiskLevel>) -> Vec<PolicyCard> {
        let _ = with_spinner(&self.multi, "Loading policies...", self.policies.load()).await;
        self.flush_notifications();

        self.policies.set_filter(severity);
        let cards = self.policies.visible();
        print_policy_stats(&self.policies.stats());
        if cards.is_empty() {
            println!("{NO_POLICIES}");
        } else {
            print_policy_cards(&cards);
        }
        cards
    }

    /// Full description of one policy. Policies are loaded first if
    /// needed.
    pub async fn policy(&mut self, id: u64) -> bool {
        if self.policies.stats().total == 0 {
            let _ = with_spinner(&self.multi, "Loading policies...", self.policies.load()).await;
            self.flush_notifications();
        }

        match self.policies.detail(id) {
            Some(detail) => {
                print_policy_detail(&detail);
                true
            }
            None => {
                println!("No policy with id {id}");
                false
            }
        }
    }

    /// Creates a task implementing a loaded policy.
    pub async fn create_task(&mut self, id: u64) {
        let task = with_spinner(
            &self.multi,
            "Creating task...",
            self.policies.create_task(id),
        )
        .await;
        if let Some(task) = task {
            print_task(&task);
        }
        self.flush_notifications();
    }
}
