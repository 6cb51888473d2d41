//! Severity tiers and map styling.

use anomaly_atlas_dashboard_models::{Severity, StateStat};

/// Visual tier of a state on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityTier {
    /// Low severity.
    Success,
    /// Medium severity.
    Warning,
    /// High severity.
    Alert,
    /// No statistics, or no severity on the record.
    Neutral,
}

impl SeverityTier {
    /// Fill colour as a CSS hex string.
    #[must_use]
    pub const fn fill_color(self) -> &'static str {
        match self {
            Self::Success => "#10B981",
            Self::Warning => "#F59E0B",
            Self::Alert => "#EF4444",
            Self::Neutral => "#3B82F6",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "low",
            Self::Warning => "medium",
            Self::Alert => "high",
            Self::Neutral => "no data",
        }
    }
}

/// Maps a severity to its tier.
#[must_use]
pub const fn tier_for(severity: Option<Severity>) -> SeverityTier {
    match severity {
        Some(Severity::High) => SeverityTier::Alert,
        Some(Severity::Medium) => SeverityTier::Warning,
        Some(Severity::Low) => SeverityTier::Success,
        None => SeverityTier::Neutral,
    }
}

/// Tier for a (possibly unmatched) state record. Depends only on the
/// record's severity.
#[must_use]
pub fn classify_severity(stat: Option<&StateStat>) -> SeverityTier {
    tier_for(stat.and_then(|s| s.severity))
}

const BORDER_COLOR: &str = "#475569";
const HIGHLIGHT_BORDER_COLOR: &str = "#FF9933";

/// Path style for one boundary feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStyle {
    pub fill_color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub color: &'static str,
    pub fill_opacity: f64,
}

impl FeatureStyle {
    /// Resting style.
    #[must_use]
    pub const fn base(tier: SeverityTier) -> Self {
        Self {
            fill_color: tier.fill_color(),
            weight: 1,
            opacity: 0.8,
            color: BORDER_COLOR,
            fill_opacity: 0.6,
        }
    }

    /// Style while the pointer is over the feature.
    #[must_use]
    pub const fn highlighted(tier: SeverityTier) -> Self {
        Self {
            fill_color: tier.fill_color(),
            weight: 2,
            opacity: 0.8,
            color: HIGHLIGHT_BORDER_COLOR,
            fill_opacity: 0.8,
        }
    }
}
