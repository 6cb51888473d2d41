//! Client-side cache of per-state statistics.
//!
//! A [`StateTable`] is immutable once built. [`StateCache`] swaps whole
//! tables behind an `Arc`, so a reader holding a snapshot keeps a
//! consistent view while a refresh lands.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use anomaly_atlas_dashboard_models::StateStat;

use crate::matching::state_key;

/// Per-state statistics indexed by case-folded state name.
#[derive(Debug, Default)]
pub struct StateTable {
    stats: Vec<StateStat>,
    /// case-folded name -> index into `stats`
    index: BTreeMap<String, usize>,
    /// States whose figures failed validation.
    inconsistent: Vec<String>,
}

impl StateTable {
    /// Builds a table from a server listing.
    ///
    /// Keeps the first record for each case-insensitive name and drops
    /// later duplicates. Records that fail [`StateStat::validate`] are
    /// kept as-is; the server is authoritative.
    #[must_use]
    pub fn new(listing: Vec<StateStat>) -> Self {
        let mut stats = Vec::with_capacity(listing.len());
        let mut index = BTreeMap::new();
        let mut inconsistent = Vec::new();

        for stat in listing {
            if let Err(e) = stat.validate() {
                log::warn!("{e}");
                inconsistent.push(stat.state.clone());
            }

            let key = state_key(&stat.state);
            if index.contains_key(&key) {
                log::warn!("Dropping duplicate statistics for state '{}'", stat.state);
                continue;
            }
            index.insert(key, stats.len());
            stats.push(stat);
        }

        Self {
            stats,
            index,
            inconsistent,
        }
    }

    /// Looks up a state by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StateStat> {
        self.index
            .get(&state_key(name))
            .and_then(|&i| self.stats.get(i))
    }

    /// Number of distinct states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether the table has no states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// States in server order.
    pub fn iter(&self) -> impl Iterator<Item = &StateStat> {
        self.stats.iter()
    }

    /// Names of received records that failed [`StateStat::validate`].
    #[must_use]
    pub fn inconsistent(&self) -> &[String] {
        &self.inconsistent
    }
}

/// Holder of the current [`StateTable`].
#[derive(Debug, Default)]
pub struct StateCache {
    current: RwLock<Arc<StateTable>>,
}

impl StateCache {
    /// Returns the current table. Later replacements do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<StateTable> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the current table wholesale and returns its length.
    pub fn replace(&self, table: StateTable) -> usize {
        let len = table.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
        len
    }
}
