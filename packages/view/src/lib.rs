#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! View model for the anomaly atlas dashboard.
//!
//! Correlates per-state anomaly statistics from the dashboard API with
//! state boundary geometry, classifies each state into a severity tier,
//! and manages the state detail panel. Front ends drive a
//! [`StateCorrelationView`] and draw the [`ViewEffect`]s it renders. The
//! [`AnalysisView`], [`PredictionView`] and [`PolicyView`] hold the other
//! dashboard pages.

pub mod analysis;
pub mod chart;
pub mod effect;
pub mod format;
pub mod geometry;
pub mod matching;
pub mod notify;
pub mod panel;
pub mod policy;
pub mod prediction;
pub mod severity;
pub mod table;
mod view;

pub use analysis::{AnalysisPage, AnalysisView};
pub use effect::ViewEffect;
pub use notify::{Notification, NotificationLevel};
pub use policy::PolicyView;
pub use prediction::PredictionView;
pub use severity::{SeverityTier, classify_severity};
pub use view::{SelectOutcome, StateCorrelationView};
