//! The state correlation view.
//!
//! Owns the client-side caches (state statistics, boundary geometry,
//! summary) and the detail panel, and exposes the user-driven operations
//! of the dashboard map. Every backend failure is absorbed here: it is
//! logged, queued as a [`Notification`], and the previous data stays in
//! place.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anomaly_atlas_client::ClientError;
use anomaly_atlas_client::provider::{GeometryProvider, StatsProvider};
use anomaly_atlas_dashboard_models::{StateDistricts, StateStat};
use geojson::Feature;

use crate::effect::{self, FeatureView, LoadedSummary, SummaryCards, ViewEffect, ViewModel};
use crate::format::format_clock;
use crate::geometry::{GeometryCache, StateBoundaries};
use crate::matching::match_feature;
use crate::notify::{Notification, Notifications};
use crate::panel::{PanelState, Resolution, Selection};
use crate::table::{StateCache, StateTable};

/// What happened to a selection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The panel now shows the requested state.
    Shown,
    /// The request failed and the panel was reset.
    Failed,
    /// A newer selection or a deselect arrived first; the response was
    /// dropped.
    Superseded,
    /// Blank name; nothing was requested.
    Ignored,
}

/// The dashboard map: statistics joined to boundaries, hover, and the
/// state detail panel.
///
/// Shared between tasks behind an [`Arc`]; every method takes `&self`.
pub struct StateCorrelationView {
    stats: Arc<dyn StatsProvider>,
    geometry: Arc<dyn GeometryProvider>,
    states: StateCache,
    boundaries: GeometryCache,
    summary: Mutex<Option<LoadedSummary>>,
    selection: Mutex<Selection>,
    hovered: Mutex<Option<usize>>,
    notifications: Notifications,
}

impl std::fmt::Debug for StateCorrelationView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCorrelationView")
            .field("states", &self.states.snapshot().len())
            .field("boundaries", &self.boundaries.get().map(|b| b.len()))
            .field("panel", &self.panel())
            .finish_non_exhaustive()
    }
}

impl StateCorrelationView {
    #[must_use]
    pub fn new(stats: Arc<dyn StatsProvider>, geometry: Arc<dyn GeometryProvider>) -> Self {
        Self {
            stats,
            geometry,
            states: StateCache::default(),
            boundaries: GeometryCache::default(),
            summary: Mutex::new(None),
            selection: Mutex::new(Selection::default()),
            hovered: Mutex::new(None),
            notifications: Notifications::default(),
        }
    }

    fn lock_selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, context: &str, e: &ClientError) {
        log::error!("{context}: {e}");
        let message = if e.is_transport() {
            format!("{context}: dashboard API unreachable ({e})")
        } else {
            format!("{context}: {e}")
        };
        self.notifications.push(Notification::error(message));
    }

    /// Fetches the national summary and replaces the cached one.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] after logging it and queueing a
    /// notification. The previous summary is kept.
    pub async fn load_summary(&self) -> Result<SummaryCards, ClientError> {
        let summary = match self.stats.summary().await {
            Ok(summary) => summary,
            Err(e) => {
                self.report("Failed to load summary", &e);
                return Err(e);
            }
        };

        let loaded = LoadedSummary {
            summary,
            loaded_at: format_clock(&chrono::Local::now()),
        };
        let cards = SummaryCards::from_loaded(&loaded);
        log::info!(
            "Loaded summary: {} records, {} anomalies",
            cards.total_records,
            cards.total_anomalies
        );

        *self.summary.lock().unwrap_or_else(PoisonError::into_inner) = Some(loaded);
        Ok(cards)
    }

    /// Fetches every state's statistics and replaces the cache wholesale.
    ///
    /// Returns the number of distinct states cached.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] after logging it and queueing a
    /// notification. The previous cache is kept.
    pub async fn load_states(&self) -> Result<usize, ClientError> {
        let listing = match self.stats.states().await {
            Ok(listing) => listing,
            Err(e) => {
                self.report("Failed to load state statistics", &e);
                return Err(e);
            }
        };

        let received = listing.len();
        let table = StateTable::new(listing);
        if !table.inconsistent().is_empty() {
            self.notifications.push(Notification::warning(format!(
                "Inconsistent statistics for {}",
                table.inconsistent().join(", ")
            )));
        }
        let cached = self.states.replace(table);
        log::info!("Cached statistics for {cached} states ({received} received)");
        Ok(cached)
    }

    /// Reloads the summary, then the state statistics.
    ///
    /// Both loads run even if the first fails. Returns `true` when both
    /// succeeded.
    pub async fn refresh(&self) -> bool {
        let summary = self.load_summary().await.is_ok();
        let states = self.load_states().await.is_ok();
        summary && states
    }

    /// Downloads the boundary geometry on first use.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] after logging it and queueing a
    /// notification. A later call tries again.
    pub async fn load_geometry(&self) -> Result<Arc<StateBoundaries>, ClientError> {
        self.boundaries
            .get_or_fetch(self.geometry.as_ref())
            .await
            .inspect_err(|e| self.report("Failed to load state boundaries", e))
    }

    /// Current statistics table.
    #[must_use]
    pub fn states(&self) -> Arc<StateTable> {
        self.states.snapshot()
    }

    /// Boundaries, if downloaded.
    #[must_use]
    pub fn boundaries(&self) -> Option<Arc<StateBoundaries>> {
        self.boundaries.get()
    }

    /// Statistics record for a boundary feature, by case-insensitive name.
    #[must_use]
    pub fn match_feature_to_stat(&self, feature: &Feature) -> Option<StateStat> {
        match_feature(&self.states.snapshot(), feature).cloned()
    }

    /// Position of the boundary feature containing the point.
    #[must_use]
    pub fn feature_index_at(&self, lng: f64, lat: f64) -> Option<usize> {
        self.boundaries.get()?.index_at(lng, lat)
    }

    /// Name to request detail for when a feature is clicked.
    ///
    /// The statistics record's own spelling when the feature matches one,
    /// otherwise the geometry name.
    #[must_use]
    pub fn selection_name(&self, index: usize) -> Option<String> {
        let boundaries = self.boundaries.get()?;
        let feature = boundaries.features().get(index)?;
        self.match_feature_to_stat(&feature.feature)
            .map(|stat| stat.state)
            .or_else(|| feature.name.clone())
    }

    fn feature_view(&self, index: usize, hovered: bool) -> Option<FeatureView> {
        let boundaries = self.boundaries.get()?;
        let feature = boundaries.features().get(index)?;
        Some(effect::feature_view(
            index,
            feature,
            &self.states.snapshot(),
            hovered,
        ))
    }

    /// Marks a feature as hovered and returns its highlighted view.
    ///
    /// `None` when geometry is not loaded or the index is out of range.
    pub fn hover(&self, index: usize) -> Option<FeatureView> {
        let view = self.feature_view(index, true)?;
        *self.hovered.lock().unwrap_or_else(PoisonError::into_inner) = Some(index);
        Some(view)
    }

    /// Clears the hover and returns the restored base view of the feature
    /// that was hovered.
    pub fn unhover(&self) -> Option<FeatureView> {
        let index = self
            .hovered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        self.feature_view(index, false)
    }

    /// Requests a state's detail and shows it in the panel.
    ///
    /// Only the most recent selection can change the panel. A response
    /// for an older selection, or one that arrives after
    /// [`deselect`](Self::deselect), is dropped.
    pub async fn select_state(&self, name: &str) -> SelectOutcome {
        let name = name.trim();
        if name.is_empty() {
            return SelectOutcome::Ignored;
        }

        let ticket = self.lock_selection().begin(name);
        log::debug!("Selecting {name} ({ticket:?})");

        match self.stats.state_detail(name).await {
            Ok(detail) => {
                let resolution = self.lock_selection().resolve(ticket, detail);
                match resolution {
                    Resolution::Applied => SelectOutcome::Shown,
                    Resolution::Stale => {
                        log::debug!("Discarding stale detail for {name} ({ticket:?})");
                        SelectOutcome::Superseded
                    }
                }
            }
            Err(e) => {
                let resolution = self.lock_selection().fail(ticket);
                match resolution {
                    Resolution::Applied => {
                        self.report(&format!("Failed to load details for {name}"), &e);
                        SelectOutcome::Failed
                    }
                    Resolution::Stale => {
                        log::debug!("Discarding stale failure for {name} ({ticket:?}): {e}");
                        SelectOutcome::Superseded
                    }
                }
            }
        }
    }

    /// Fetches a state's district breakdown.
    ///
    /// The cached record's spelling is used when the name matches one.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] after logging it and queueing a
    /// notification.
    pub async fn load_districts(&self, name: &str) -> Result<StateDistricts, ClientError> {
        let name = self
            .states
            .snapshot()
            .get(name)
            .map_or_else(|| name.trim().to_string(), |s| s.state.clone());

        self.stats
            .state_districts(&name)
            .await
            .inspect(|d| log::debug!("Loaded {} districts for {name}", d.districts.len()))
            .inspect_err(|e| self.report(&format!("Failed to load districts for {name}"), e))
    }

    /// Resets the panel and invalidates any in-flight selection.
    pub fn deselect(&self) {
        self.lock_selection().clear();
    }

    #[must_use]
    pub fn panel(&self) -> PanelState {
        self.lock_selection().panel().clone()
    }

    #[must_use]
    pub fn summary(&self) -> Option<LoadedSummary> {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains queued notifications.
    #[must_use]
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.notifications.take()
    }

    /// Describes the current view. Pending notifications are included but
    /// not drained.
    #[must_use]
    pub fn render(&self) -> Vec<ViewEffect> {
        let summary = self.summary();
        let table = self.states.snapshot();
        let boundaries = self.boundaries.get();
        let hovered = *self.hovered.lock().unwrap_or_else(PoisonError::into_inner);
        let panel = self.panel();
        let notifications = self.notifications.pending();

        effect::render(&ViewModel {
            summary: summary.as_ref(),
            table: &table,
            boundaries: boundaries.as_deref(),
            hovered,
            panel: &panel,
            notifications: &notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anomaly_atlas_dashboard_models::DashboardSummary;
    use geojson::FeatureCollection;
    use serde_json::json;
    use tokio::sync::oneshot;

    use crate::effect::PanelView;
    use crate::notify::NotificationLevel;
    use crate::severity::SeverityTier;

    fn stat(state: &str, severity: &str) -> StateStat {
        serde_json::from_value(json!({
            "state": state,
            "total_records": 200_000,
            "total_anomalies": 5_000,
            "anomaly_rate": 2.5,
            "severity": severity
        }))
        .unwrap()
    }

    #[derive(Default)]
    struct FakeStats {
        /// `None` makes `states()` fail.
        listing: Mutex<Option<Vec<StateStat>>>,
        summary: Option<DashboardSummary>,
        details: BTreeMap<String, StateStat>,
        /// Detail requests for these states wait until the sender fires.
        gates: Mutex<BTreeMap<String, oneshot::Receiver<()>>>,
        detail_calls: AtomicUsize,
        districts_fail: Mutex<bool>,
        /// Failures look like HTTP errors instead of error envelopes.
        transport_failure: Mutex<bool>,
    }

    impl FakeStats {
        fn with_states(states: &[(&str, &str)]) -> Self {
            let listing: Vec<StateStat> = states.iter().map(|(s, sev)| stat(s, sev)).collect();
            let details = listing
                .iter()
                .map(|s| (s.state.clone(), s.clone()))
                .collect();
            Self {
                listing: Mutex::new(Some(listing)),
                details,
                ..Self::default()
            }
        }

        fn gate(&self, state: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(state.to_string(), rx);
            tx
        }

        fn fail_listing(&self) {
            *self.listing.lock().unwrap() = None;
        }
    }

    fn unavailable() -> ClientError {
        ClientError::Protocol {
            message: "service unavailable".to_string(),
        }
    }

    #[async_trait::async_trait]
    impl StatsProvider for FakeStats {
        async fn summary(&self) -> Result<DashboardSummary, ClientError> {
            self.summary.clone().ok_or_else(unavailable)
        }

        async fn states(&self) -> Result<Vec<StateStat>, ClientError> {
            self.listing.lock().unwrap().clone().ok_or_else(unavailable)
        }

        async fn state_detail(&self, state: &str) -> Result<StateStat, ClientError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(state);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.details.get(state).cloned().ok_or_else(|| ClientError::Protocol {
                message: format!("State not found: {state}"),
            })
        }

        async fn state_districts(&self, state: &str) -> Result<StateDistricts, ClientError> {
            if *self.districts_fail.lock().unwrap() {
                if *self.transport_failure.lock().unwrap() {
                    return Err(ClientError::Status {
                        status: 503,
                        url: "http://localhost/dashboard/api/state/districts".to_string(),
                    });
                }
                return Err(unavailable());
            }
            Ok(StateDistricts {
                state: state.to_string(),
                districts: Vec::new(),
            })
        }
    }

    struct FakeGeometry;

    #[async_trait::async_trait]
    impl GeometryProvider for FakeGeometry {
        async fn feature_collection(&self) -> Result<FeatureCollection, ClientError> {
            let square = |x: f64, y: f64| {
                json!({
                    "type": "Polygon",
                    "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]]
                })
            };
            let text = json!({
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"NAME_1": "BIHAR"}, "geometry": square(85.0, 25.0)},
                    {"type": "Feature", "properties": {"name": "kerala"}, "geometry": square(76.0, 9.0)},
                    {"type": "Feature", "properties": {"name": "Ladakh"}, "geometry": square(77.0, 34.0)}
                ]
            })
            .to_string();
            Ok(text.parse().unwrap())
        }
    }

    fn harness(stats: FakeStats) -> (StateCorrelationView, Arc<FakeStats>) {
        let stats = Arc::new(stats);
        let view = StateCorrelationView::new(stats.clone(), Arc::new(FakeGeometry));
        (view, stats)
    }

    fn shown_state(view: &StateCorrelationView) -> Option<String> {
        match view.panel() {
            PanelState::Shown { detail, .. } => Some(detail.state),
            _ => None,
        }
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_cache() {
        let (view, stats) = harness(FakeStats::with_states(&[
            ("Bihar", "high"),
            ("Kerala", "low"),
            ("Goa", "medium"),
        ]));

        assert_eq!(view.load_states().await.unwrap(), 3);
        let before = view.states();
        assert_eq!(before.len(), 3);

        stats.fail_listing();
        assert!(view.load_states().await.is_err());

        assert!(Arc::ptr_eq(&before, &view.states()));
        let notes = view.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn matches_features_case_insensitively() {
        let (view, _) = harness(FakeStats::with_states(&[("Bihar", "high"), ("Kerala", "low")]));
        view.load_states().await.unwrap();
        let boundaries = view.load_geometry().await.unwrap();

        let features = boundaries.features();
        let bihar = view.match_feature_to_stat(&features[0].feature).unwrap();
        let kerala = view.match_feature_to_stat(&features[1].feature).unwrap();
        assert_eq!(bihar.state, "Bihar");
        assert_eq!(kerala.state, "Kerala");
        assert!(view.match_feature_to_stat(&features[2].feature).is_none());

        assert_eq!(view.feature_index_at(85.5, 25.5), Some(0));
        assert_eq!(view.feature_index_at(0.0, 0.0), None);
    }

    #[tokio::test]
    async fn selection_uses_statistics_spelling() {
        let (view, stats) = harness(FakeStats::with_states(&[("Bihar", "high")]));
        view.load_states().await.unwrap();
        view.load_geometry().await.unwrap();

        let index = view.feature_index_at(85.5, 25.5).unwrap();
        let name = view.selection_name(index).unwrap();
        assert_eq!(name, "Bihar");
        assert_eq!(view.selection_name(2).as_deref(), Some("Ladakh"));
        assert!(view.selection_name(99).is_none());

        assert_eq!(view.select_state(&name).await, SelectOutcome::Shown);
        assert_eq!(stats.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn inconsistent_records_raise_a_warning() {
        let mut broken = stat("Sikkim", "low");
        broken.total_anomalies = broken.total_records + 1;
        let stats = FakeStats::with_states(&[("Goa", "low")]);
        stats.listing.lock().unwrap().as_mut().unwrap().push(broken);
        let (view, _) = harness(stats);

        assert_eq!(view.load_states().await.unwrap(), 2);
        let notes = view.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Warning);
        assert!(notes[0].message.contains("Sikkim"));
    }

    #[tokio::test]
    async fn districts_use_cached_spelling_and_report_failures() {
        let (view, stats) = harness(FakeStats::with_states(&[("Bihar", "high")]));
        view.load_states().await.unwrap();

        let districts = view.load_districts("BIHAR").await.unwrap();
        assert_eq!(districts.state, "Bihar");
        assert!(view.take_notifications().is_empty());

        *stats.districts_fail.lock().unwrap() = true;
        assert!(view.load_districts("Bihar").await.is_err());
        let notes = view.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("districts for Bihar"));
    }

    #[tokio::test]
    async fn unreachable_api_is_named_in_notification() {
        let (view, stats) = harness(FakeStats::with_states(&[("Goa", "low")]));
        *stats.districts_fail.lock().unwrap() = true;
        *stats.transport_failure.lock().unwrap() = true;

        assert!(view.load_districts("Goa").await.is_err());
        let notes = view.take_notifications();
        assert!(notes[0].message.contains("dashboard API unreachable"));
        assert!(notes[0].message.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn failed_reload_still_renders_cached_data() {
        let mut fake = FakeStats::with_states(&[("Goa", "low")]);
        fake.summary = Some(
            serde_json::from_value(json!({
                "total_records": 1000,
                "total_anomalies": 100,
                "anomaly_rate": 10.0,
                "verified_fixed": 40,
                "pending_verification": 60
            }))
            .unwrap(),
        );
        let (view, stats) = harness(fake);
        assert!(view.refresh().await);

        stats.fail_listing();
        assert!(!view.refresh().await);

        let effects = view.render();
        assert!(matches!(effects[0], ViewEffect::SummaryCards(_)));
        assert_eq!(view.states().len(), 1);
        assert!(matches!(effects.last(), Some(ViewEffect::Notify(_))));
    }

    #[tokio::test]
    async fn render_styles_every_feature_and_highlights_hover() {
        let (view, _) = harness(FakeStats::with_states(&[("Bihar", "high"), ("Kerala", "low")]));
        view.load_states().await.unwrap();
        view.load_geometry().await.unwrap();

        let hovered = view.hover(1).unwrap();
        assert_eq!(hovered.style.color, "#FF9933");
        assert!(view.hover(99).is_none());

        let effects = view.render();
        let styles = effects
            .iter()
            .find_map(|e| match e {
                ViewEffect::MapStyles(styles) => Some(styles),
                _ => None,
            })
            .unwrap();
        let tiers: Vec<SeverityTier> = styles.iter().map(|s| s.tier).collect();
        assert_eq!(
            tiers,
            [SeverityTier::Alert, SeverityTier::Success, SeverityTier::Neutral]
        );
        assert_eq!(styles[1].style.weight, 2);
        assert_eq!(styles[0].style.weight, 1);
        assert_eq!(styles[2].tooltip.title, "Ladakh");
        assert!(styles[2].tooltip.lines.is_empty());

        let restored = view.unhover().unwrap();
        assert_eq!(restored.index, 1);
        assert_eq!(restored.style.color, "#475569");
        assert!(view.unhover().is_none());
    }

    #[tokio::test]
    async fn select_shows_detail() {
        let (view, _) = harness(FakeStats::with_states(&[("Goa", "medium")]));
        assert_eq!(view.select_state("Goa").await, SelectOutcome::Shown);
        assert_eq!(shown_state(&view).as_deref(), Some("Goa"));
        assert!(matches!(
            view.render().last(),
            Some(ViewEffect::Panel(PanelView::Shown(content))) if content.title == "Goa"
        ));
    }

    #[tokio::test]
    async fn blank_selection_is_ignored() {
        let (view, stats) = harness(FakeStats::with_states(&[("Goa", "medium")]));
        assert_eq!(view.select_state("   ").await, SelectOutcome::Ignored);
        assert_eq!(stats.detail_calls.load(Ordering::SeqCst), 0);
        assert_eq!(view.panel(), PanelState::Unselected);
    }

    #[tokio::test]
    async fn failed_selection_resets_panel_and_notifies() {
        let (view, _) = harness(FakeStats::with_states(&[("Goa", "medium")]));
        view.select_state("Goa").await;

        assert_eq!(view.select_state("Atlantis").await, SelectOutcome::Failed);
        assert_eq!(view.panel(), PanelState::Unselected);

        let notes = view.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("Atlantis"));
    }

    #[tokio::test]
    async fn late_response_for_earlier_selection_is_discarded() {
        let (view, stats) = harness(FakeStats::with_states(&[("Bihar", "high"), ("Kerala", "low")]));
        let release_bihar = stats.gate("Bihar");

        let mut bihar = Box::pin(view.select_state("Bihar"));
        assert!(futures::poll!(&mut bihar).is_pending());
        assert_eq!(view.panel().state_name(), Some("Bihar"));

        assert_eq!(view.select_state("Kerala").await, SelectOutcome::Shown);

        release_bihar.send(()).unwrap();
        assert_eq!(bihar.await, SelectOutcome::Superseded);
        assert_eq!(shown_state(&view).as_deref(), Some("Kerala"));
    }

    #[tokio::test]
    async fn deselect_while_in_flight_stays_unselected() {
        let (view, stats) = harness(FakeStats::with_states(&[("Assam", "low")]));
        let release = stats.gate("Assam");

        let mut assam = Box::pin(view.select_state("Assam"));
        assert!(futures::poll!(&mut assam).is_pending());

        view.deselect();
        release.send(()).unwrap();

        assert_eq!(assam.await, SelectOutcome::Superseded);
        assert_eq!(view.panel(), PanelState::Unselected);
        assert!(view.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn deselect_after_shown_resets_panel() {
        let (view, _) = harness(FakeStats::with_states(&[("Assam", "low")]));
        view.select_state("Assam").await;
        view.deselect();
        assert_eq!(view.panel(), PanelState::Unselected);
    }

    #[tokio::test]
    async fn refresh_reports_summary_failure_but_loads_states() {
        let (view, _) = harness(FakeStats::with_states(&[("Goa", "low")]));
        assert!(!view.refresh().await);
        assert_eq!(view.states().len(), 1);
        assert!(view.summary().is_none());
        assert_eq!(view.take_notifications().len(), 1);
    }

    #[tokio::test]
    async fn summary_progress_is_verified_share() {
        let mut stats = FakeStats::with_states(&[]);
        stats.summary = Some(
            serde_json::from_value(json!({
                "total_records": 1000,
                "total_anomalies": 100,
                "anomaly_rate": 10.0,
                "verified_fixed": 40,
                "pending_verification": 60
            }))
            .unwrap(),
        );
        let (view, _) = harness(stats);

        let cards = view.load_summary().await.unwrap();
        assert_eq!(cards.fix_progress, "40%");
        assert!(view.refresh().await);
    }
}
