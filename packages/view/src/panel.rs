//! State detail panel.
//!
//! ```text
//! Unselected --begin--> Loading --resolve ok--> Shown
//!                         |  \--resolve err--> Unselected
//! Shown --begin--> Loading
//! Loading/Shown --clear--> Unselected
//! ```
//!
//! Every [`Selection::begin`] issues a fresh ticket. A response is only
//! applied while the panel is still loading that exact ticket, so late
//! responses for superseded or cleared selections are dropped.

use anomaly_atlas_dashboard_models::StateStat;

use crate::chart::{ChartSpec, district_chart};
use crate::format::{format_number, format_percent, format_ratio};

/// Identifies one selection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionTicket(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelState {
    #[default]
    Unselected,
    Loading {
        state: String,
        ticket: SelectionTicket,
    },
    Shown {
        ticket: SelectionTicket,
        detail: Box<StateStat>,
    },
}

impl PanelState {
    /// Name of the selected (or loading) state.
    #[must_use]
    pub fn state_name(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Loading { state, .. } => Some(state),
            Self::Shown { detail, .. } => Some(&detail.state),
        }
    }
}

/// Whether a resolved response changed the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

/// Panel state plus the ticket counter that guards it.
#[derive(Debug, Default)]
pub struct Selection {
    last_ticket: u64,
    panel: PanelState,
}

impl Selection {
    /// Starts loading `state` and returns the ticket for its response.
    pub fn begin(&mut self, state: &str) -> SelectionTicket {
        self.last_ticket += 1;
        let ticket = SelectionTicket(self.last_ticket);
        self.panel = PanelState::Loading {
            state: state.to_string(),
            ticket,
        };
        ticket
    }

    const fn is_loading(&self, ticket: SelectionTicket) -> bool {
        matches!(self.panel, PanelState::Loading { ticket: t, .. } if t.0 == ticket.0)
    }

    /// Shows `detail` if `ticket` is still the one being loaded.
    pub fn resolve(&mut self, ticket: SelectionTicket, detail: StateStat) -> Resolution {
        if !self.is_loading(ticket) {
            return Resolution::Stale;
        }
        self.panel = PanelState::Shown {
            ticket,
            detail: Box::new(detail),
        };
        Resolution::Applied
    }

    /// Returns to Unselected if `ticket` is still the one being loaded.
    pub fn fail(&mut self, ticket: SelectionTicket) -> Resolution {
        if !self.is_loading(ticket) {
            return Resolution::Stale;
        }
        self.panel = PanelState::Unselected;
        Resolution::Applied
    }

    /// Returns to Unselected. Any in-flight ticket becomes stale.
    pub fn clear(&mut self) {
        self.panel = PanelState::Unselected;
    }

    #[must_use]
    pub const fn panel(&self) -> &PanelState {
        &self.panel
    }
}

/// Formatted contents of a shown panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelContent {
    pub title: String,
    pub records: String,
    pub anomalies: String,
    pub anomaly_rate: String,
    pub invalid_pin_rate: String,
    pub duplicate_rate: String,
    pub missing_dob_rate: String,
    /// `(anomaly type, formatted count)`
    pub top_anomaly_types: Vec<(String, String)>,
    pub district_chart: ChartSpec,
}

impl PanelContent {
    #[must_use]
    pub fn from_stat(stat: &StateStat) -> Self {
        Self {
            title: stat.state.clone(),
            records: format_number(stat.total_records),
            anomalies: format_number(stat.total_anomalies),
            anomaly_rate: format_percent(stat.anomaly_rate),
            invalid_pin_rate: format_ratio(stat.invalid_pin_rate),
            duplicate_rate: format_ratio(stat.duplicate_rate),
            missing_dob_rate: format_ratio(stat.missing_dob_rate),
            top_anomaly_types: stat
                .top_anomaly_types
                .iter()
                .map(|a| (a.anomaly_type.clone(), format_number(a.count)))
                .collect(),
            district_chart: district_chart(&stat.state, &stat.district_distribution),
        }
    }
}
