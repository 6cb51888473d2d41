//! Chart descriptions and the drawing-surface seam.
//!
//! The view builds [`ChartSpec`]s; a front end implements
//! [`ChartSurface`] to draw them. Re-rendering a chart always disposes
//! the previous handle first so surfaces never accumulate stale charts.

use anomaly_atlas_dashboard_models::DistrictRecords;

use crate::format::{format_number, format_optional_number};

/// Chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Vertical bars.
    Bar,
    /// Bars along the y axis.
    HorizontalBar,
    Doughnut,
}

/// Everything needed to draw one single-series chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    /// Legend label of the series.
    pub series_label: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    /// CSS colours. One entry applies to every bar; otherwise colours
    /// cycle per data point.
    pub colors: Vec<&'static str>,
}

impl ChartSpec {
    /// Colour for data point `index`.
    #[must_use]
    pub fn color_at(&self, index: usize) -> Option<&'static str> {
        if self.colors.is_empty() {
            return None;
        }
        self.colors.get(index % self.colors.len()).copied()
    }

    /// `(label, value)` pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Opaque reference to a chart drawn on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// Something that can draw charts.
pub trait ChartSurface {
    /// Draws a chart and returns a handle to it.
    fn draw(&mut self, chart: &ChartSpec) -> ChartHandle;

    /// Removes a previously drawn chart.
    fn dispose(&mut self, handle: ChartHandle);
}

/// Draws `chart`, disposing `prior` first when present.
pub fn render_chart<S: ChartSurface + ?Sized>(
    surface: &mut S,
    chart: &ChartSpec,
    prior: Option<ChartHandle>,
) -> ChartHandle {
    if let Some(handle) = prior {
        surface.dispose(handle);
    }
    surface.draw(chart)
}

/// A named chart position that remembers what is currently drawn there.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<ChartHandle>,
}

impl ChartSlot {
    /// Replaces whatever this slot shows with `chart`.
    pub fn show<S: ChartSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        chart: &ChartSpec,
    ) -> ChartHandle {
        let handle = render_chart(surface, chart, self.current.take());
        self.current = Some(handle);
        handle
    }

    /// Disposes the chart in this slot, if any.
    pub fn clear<S: ChartSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(handle) = self.current.take() {
            surface.dispose(handle);
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<ChartHandle> {
        self.current
    }
}

/// District records bar chart for the detail panel.
#[must_use]
pub fn district_chart(state: &str, districts: &[DistrictRecords]) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: format!("{state} districts"),
        series_label: "Records".to_string(),
        labels: districts.iter().map(|d| d.district.clone()).collect(),
        values: districts.iter().map(|d| d.records).collect(),
        colors: vec!["rgba(255, 153, 51, 0.6)"],
    }
}

/// One line of the district breakdown table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictRow {
    pub district: String,
    pub records: String,
    /// [`MISSING`](crate::format::MISSING) when the server omits it.
    pub anomalies: String,
}

#[must_use]
pub fn district_rows(districts: &[DistrictRecords]) -> Vec<DistrictRow> {
    districts
        .iter()
        .map(|d| DistrictRow {
            district: d.district.clone(),
            records: format_number(d.records),
            anomalies: format_optional_number(d.anomalies),
        })
        .collect()
}
