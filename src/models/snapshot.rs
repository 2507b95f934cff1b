// Aggregated snapshot: service name -> latest known status

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ServiceStatus;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub services: HashMap<String, ServiceStatus>,
    /// Unix millis of the last completed refresh; `None` before the first one.
    pub refreshed_at: Option<u64>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ServiceStatus> {
        self.services.get(name)
    }

    /// Inserts or overwrites the entry keyed by the service name (last write wins).
    pub fn upsert(&mut self, status: ServiceStatus) {
        self.services.insert(status.name.clone(), status);
    }

    /// Services ordered by name, case-insensitive; recomputed on every call.
    /// The returned iterator is cloneable, so it can be walked more than once.
    pub fn render_list(&self) -> std::vec::IntoIter<&ServiceStatus> {
        let mut list: Vec<&ServiceStatus> = self.services.values().collect();
        list.sort_by_cached_key(|s| (s.name.to_lowercase(), s.name.clone()));
        list.into_iter()
    }
}

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub succeeded: usize,
    pub failed: usize,
}
