//! Pure rendering of the dashboard into front-end effects.
//!
//! [`render`] turns a [`ViewModel`] snapshot into a list of
//! [`ViewEffect`]s. It performs no I/O and touches no shared state, so a
//! front end can call it as often as it likes.

use anomaly_atlas_dashboard_models::{DashboardSummary, StateStat};
use geo::{Point, Rect};

use crate::format::{MISSING, format_date, format_number, format_percent};
use crate::geometry::{MapFeature, StateBoundaries};
use crate::notify::Notification;
use crate::panel::{PanelContent, PanelState};
use crate::severity::{FeatureStyle, SeverityTier, classify_severity};
use crate::table::StateTable;

/// Panel text shown when nothing is selected.
pub const PANEL_PLACEHOLDER: &str = "Click a state to view details";

/// A summary as loaded, with the local time it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSummary {
    pub summary: DashboardSummary,
    pub loaded_at: String,
}

/// Headline cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCards {
    pub total_records: String,
    pub total_anomalies: String,
    pub anomaly_rate: String,
    pub verified_fixed: String,
    pub pending_verification: String,
    /// Width of the fix-progress bar, e.g. `"40%"`.
    pub fix_progress: String,
    /// Local time the summary arrived.
    pub last_updated: String,
    /// Date of the server-side aggregation.
    pub data_as_of: String,
}

impl SummaryCards {
    #[must_use]
    pub fn from_loaded(loaded: &LoadedSummary) -> Self {
        let summary = &loaded.summary;
        Self {
            total_records: format_number(summary.total_records),
            total_anomalies: format_number(summary.total_anomalies),
            anomaly_rate: format_percent(summary.anomaly_rate),
            verified_fixed: format_number(summary.verified_fixed),
            pending_verification: format_number(summary.pending_verification),
            fix_progress: format!("{}%", summary.fix_progress_percent()),
            last_updated: loaded.loaded_at.clone(),
            data_as_of: summary
                .last_updated
                .as_deref()
                .map_or_else(|| MISSING.to_string(), format_date),
        }
    }
}

/// One entry of the most-affected list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedStateRow {
    /// 1-based.
    pub rank: usize,
    pub state: String,
    pub anomalies: String,
}

#[must_use]
pub fn affected_rows(summary: &DashboardSummary) -> Vec<AffectedStateRow> {
    summary
        .most_affected_states
        .iter()
        .enumerate()
        .map(|(i, s)| AffectedStateRow {
            rank: i + 1,
            state: s.state.clone(),
            anomalies: format!("{} anomalies", format_number(s.anomaly_count)),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

/// Tooltip for a feature name and its matched record.
#[must_use]
pub fn tooltip(name: Option<&str>, stat: Option<&StateStat>) -> Tooltip {
    let lines = stat.map_or_else(Vec::new, |s| {
        vec![
            format!("Records: {}", format_number(s.total_records)),
            format!("Anomalies: {}", format_number(s.total_anomalies)),
            format!("Rate: {}", format_percent(s.anomaly_rate)),
        ]
    });
    Tooltip {
        title: name.unwrap_or("Unknown").to_string(),
        lines,
    }
}

/// Presentation of one boundary feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureView {
    /// Position in the boundary collection.
    pub index: usize,
    pub name: Option<String>,
    pub tier: SeverityTier,
    pub style: FeatureStyle,
    pub tooltip: Tooltip,
    /// Where the tooltip is pinned.
    pub anchor: Option<Point<f64>>,
}

#[must_use]
pub fn feature_view(
    index: usize,
    feature: &MapFeature,
    table: &StateTable,
    hovered: bool,
) -> FeatureView {
    let name = feature.name.as_deref();
    let stat = name.and_then(|n| table.get(n));
    let tier = classify_severity(stat);
    let style = if hovered {
        FeatureStyle::highlighted(tier)
    } else {
        FeatureStyle::base(tier)
    };

    FeatureView {
        index,
        name: feature.name.clone(),
        tier,
        style,
        tooltip: tooltip(name, stat),
        anchor: feature.anchor,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Placeholder(&'static str),
    Loading { state: String },
    Shown(Box<PanelContent>),
}

impl PanelView {
    #[must_use]
    pub fn from_state(state: &PanelState) -> Self {
        match state {
            PanelState::Unselected => Self::Placeholder(PANEL_PLACEHOLDER),
            PanelState::Loading { state, .. } => Self::Loading {
                state: state.clone(),
            },
            PanelState::Shown { detail, .. } => {
                Self::Shown(Box::new(PanelContent::from_stat(detail)))
            }
        }
    }
}

/// One thing the front end should display.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEffect {
    SummaryCards(SummaryCards),
    AffectedStates(Vec<AffectedStateRow>),
    /// Extent the map should initially show.
    FitBounds(Rect<f64>),
    MapStyles(Vec<FeatureView>),
    Panel(PanelView),
    Notify(Notification),
}

/// Snapshot of everything [`render`] reads.
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    pub summary: Option<&'a LoadedSummary>,
    pub table: &'a StateTable,
    pub boundaries: Option<&'a StateBoundaries>,
    /// Index of the feature under the pointer.
    pub hovered: Option<usize>,
    pub panel: &'a PanelState,
    pub notifications: &'a [Notification],
}

/// Describes the current view.
///
/// Summary effects appear once a summary has loaded; map extent and
/// styles once geometry has loaded. The panel is always present.
#[must_use]
pub fn render(model: &ViewModel<'_>) -> Vec<ViewEffect> {
    let mut effects = Vec::new();

    if let Some(loaded) = model.summary {
        effects.push(ViewEffect::SummaryCards(SummaryCards::from_loaded(loaded)));
        effects.push(ViewEffect::AffectedStates(affected_rows(&loaded.summary)));
    }

    if let Some(boundaries) = model.boundaries {
        if let Some(extent) = boundaries.bounds() {
            effects.push(ViewEffect::FitBounds(extent));
        }
        let styles = boundaries
            .features()
            .iter()
            .enumerate()
            .map(|(i, f)| feature_view(i, f, model.table, model.hovered == Some(i)))
            .collect();
        effects.push(ViewEffect::MapStyles(styles));
    }

    effects.push(ViewEffect::Panel(PanelView::from_state(model.panel)));

    effects.extend(model.notifications.iter().cloned().map(ViewEffect::Notify));

    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary() -> LoadedSummary {
        LoadedSummary {
            summary: serde_json::from_value(json!({
                "total_records": 142_000_000,
                "total_anomalies": 100,
                "anomaly_rate": 2.4,
                "verified_fixed": 40,
                "pending_verification": 60,
                "most_affected_states": [
                    {"state": "Uttar Pradesh", "anomaly_count": 45_000},
                    {"state": "Bihar", "anomaly_count": 900}
                ],
                "last_updated": "2026-01-31T23:05:00"
            }))
            .unwrap(),
            loaded_at: "10:15:00".to_string(),
        }
    }

    fn stat() -> StateStat {
        serde_json::from_value(json!({
            "state": "Goa",
            "total_records": 64_000,
            "total_anomalies": 1_900,
            "anomaly_rate": 2.97,
            "severity": "high"
        }))
        .unwrap()
    }

    #[test]
    fn summary_cards_show_fix_progress_width() {
        let cards = SummaryCards::from_loaded(&summary());
        assert_eq!(cards.fix_progress, "40%");
        assert_eq!(cards.total_records, "142.0M");
        assert_eq!(cards.anomaly_rate, "2.4%");
        assert_eq!(cards.last_updated, "10:15:00");
        assert_eq!(cards.data_as_of, "2026-01-31");

        let mut undated = summary();
        undated.summary.last_updated = None;
        assert_eq!(SummaryCards::from_loaded(&undated).data_as_of, MISSING);
    }

    #[test]
    fn affected_states_are_ranked_from_one() {
        let rows = affected_rows(&summary().summary);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].anomalies, "45.0K anomalies");
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].state, "Bihar");
    }

    #[test]
    fn tooltip_lines_only_for_matched_states() {
        let matched = tooltip(Some("Goa"), Some(&stat()));
        assert_eq!(matched.title, "Goa");
        assert_eq!(
            matched.lines,
            ["Records: 64.0K", "Anomalies: 1.9K", "Rate: 2.97%"]
        );

        let unmatched = tooltip(None, None);
        assert_eq!(unmatched.title, "Unknown");
        assert!(unmatched.lines.is_empty());
    }

    #[test]
    fn render_without_data_shows_placeholder_panel() {
        let table = StateTable::default();
        let panel = PanelState::Unselected;
        let model = ViewModel {
            summary: None,
            table: &table,
            boundaries: None,
            hovered: None,
            panel: &panel,
            notifications: &[],
        };

        assert_eq!(
            render(&model),
            [ViewEffect::Panel(PanelView::Placeholder(PANEL_PLACEHOLDER))]
        );
    }

    #[test]
    fn render_includes_summary_and_notifications() {
        let table = StateTable::new(vec![stat()]);
        let loaded = summary();
        let panel = PanelState::Loading {
            state: "Goa".to_string(),
            ticket: crate::panel::Selection::default().begin("Goa"),
        };
        let notes = [Notification::error("Failed to load states")];
        let model = ViewModel {
            summary: Some(&loaded),
            table: &table,
            boundaries: None,
            hovered: None,
            panel: &panel,
            notifications: &notes,
        };

        let effects = render(&model);
        assert_eq!(effects.len(), 4);
        assert!(matches!(effects[0], ViewEffect::SummaryCards(_)));
        assert!(matches!(effects[1], ViewEffect::AffectedStates(ref rows) if rows.len() == 2));
        assert!(matches!(effects[2], ViewEffect::Panel(PanelView::Loading { ref state }) if state == "Goa"));
        assert!(matches!(effects[3], ViewEffect::Notify(_)));
    }

    #[test]
    fn render_fits_map_to_boundaries_and_pins_tooltips() {
        let collection: geojson::FeatureCollection = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Goa"}, "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[73.0, 15.0], [74.0, 15.0], [74.0, 16.0], [73.0, 16.0], [73.0, 15.0]]]
                }},
                {"type": "Feature", "properties": {"name": "Nowhere"}, "geometry": null}
            ]
        })
        .to_string()
        .parse()
        .unwrap();
        let boundaries = StateBoundaries::from_collection(collection);
        let table = StateTable::new(vec![stat()]);
        let panel = PanelState::Unselected;
        let model = ViewModel {
            summary: None,
            table: &table,
            boundaries: Some(&boundaries),
            hovered: None,
            panel: &panel,
            notifications: &[],
        };

        let effects = render(&model);
        let ViewEffect::FitBounds(extent) = effects[0] else {
            panic!("expected FitBounds first, got {:?}", effects[0]);
        };
        assert!((extent.min().x - 73.0).abs() < 1e-9);
        assert!((extent.max().y - 16.0).abs() < 1e-9);

        let ViewEffect::MapStyles(ref styles) = effects[1] else {
            panic!("expected MapStyles, got {:?}", effects[1]);
        };
        let anchor = styles[0].anchor.unwrap();
        assert!((anchor.x() - 73.5).abs() < 1e-9);
        assert!(styles[1].anchor.is_none());
    }
}
