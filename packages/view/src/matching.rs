//! Correlating boundary features with state statistics.
//!
//! Boundary files disagree on which property carries the state name, so
//! `NAME_1` is tried first and `name` second.

use anomaly_atlas_dashboard_models::StateStat;
use geojson::Feature;

use crate::table::StateTable;

/// Property keys that may hold a state name, in priority order.
pub const NAME_PROPERTIES: [&str; 2] = ["NAME_1", "name"];

/// Returns the feature's state name as written in the boundary file.
///
/// Blank values count as missing, so a blank `NAME_1` falls through to
/// `name`.
#[must_use]
pub fn feature_name(feature: &Feature) -> Option<&str> {
    NAME_PROPERTIES.iter().find_map(|key| {
        feature
            .property(key)
            .and_then(serde_json::Value::as_str)
            .filter(|name| !name.trim().is_empty())
    })
}

/// Case-folded lookup key for a state name. Whitespace is significant.
#[must_use]
pub fn state_key(name: &str) -> String {
    name.to_lowercase()
}

/// Finds the statistics record for a boundary feature.
#[must_use]
pub fn match_feature<'a>(table: &'a StateTable, feature: &Feature) -> Option<&'a StateStat> {
    let name = feature_name(feature)?;
    let stat = table.get(name);
    if stat.is_none() {
        log::trace!("No statistics for boundary feature '{name}'");
    }
    stat
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(properties: serde_json::Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    fn stat(state: &str) -> StateStat {
        serde_json::from_value(json!({
            "state": state,
            "total_records": 1000,
            "total_anomalies": 10,
            "anomaly_rate": 1.0,
            "severity": "low"
        }))
        .unwrap()
    }

    #[test]
    fn prefers_name_1_over_name() {
        let f = feature(json!({"NAME_1": "Kerala", "name": "Keralam"}));
        assert_eq!(feature_name(&f), Some("Kerala"));
    }

    #[test]
    fn blank_name_1_falls_back_to_name() {
        let f = feature(json!({"NAME_1": "  ", "name": "Goa"}));
        assert_eq!(feature_name(&f), Some("Goa"));
    }

    #[test]
    fn non_string_or_missing_names_are_none() {
        assert_eq!(feature_name(&feature(json!({"NAME_1": 7}))), None);
        assert_eq!(feature_name(&feature(json!({}))), None);
    }

    #[test]
    fn matches_regardless_of_case() {
        let table = StateTable::new(vec![stat("Tamil Nadu")]);

        let lower = feature(json!({"NAME_1": "tamil nadu"}));
        let upper = feature(json!({"NAME_1": "Tamil Nadu".to_uppercase()}));

        let a = match_feature(&table, &lower).unwrap();
        let b = match_feature(&table, &upper).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.state, "Tamil Nadu");
    }

    #[test]
    fn padded_names_do_not_match() {
        let table = StateTable::new(vec![stat("Goa")]);
        let f = feature(json!({"NAME_1": " Goa "}));
        assert_eq!(feature_name(&f), Some(" Goa "));
        assert!(match_feature(&table, &f).is_none());
        assert_ne!(state_key(" Goa"), state_key("goa"));
    }

    #[test]
    fn unknown_state_is_a_miss() {
        let table = StateTable::new(vec![stat("Goa")]);
        let f = feature(json!({"name": "Atlantis"}));
        assert!(match_feature(&table, &f).is_none());
    }
}
