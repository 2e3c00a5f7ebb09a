//! RegistryStore — shared in-memory record store.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{MintRecord, UNKNOWN_LATENCY_MS};

/// Thread-safe store of the current mint record set.
#[derive(Clone, Default)]
pub struct RegistryStore {
    records: Arc<RwLock<HashMap<String, MintRecord>>>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire record set.
    ///
    /// This is the dataset-refresh path: the incoming set wins wholesale,
    /// except that probe-owned fields (latency, units) are carried over
    /// from any existing record for the same URL, so a refresh does not
    /// erase measurements the loader never had.
    pub async fn replace_all(&self, records: Vec<MintRecord>) {
        let mut map = self.records.write().await;
        let old = std::mem::take(&mut *map);
        for mut record in records {
            if let Some(prev) = old.get(&record.url) {
                record.latency_ms = prev.latency_ms;
                record.units = prev.units.clone();
                record.currency_count = prev.currency_count;
            }
            map.insert(record.url.clone(), record);
        }
        debug!(count = map.len(), "record set replaced");
    }

    /// Record a latency measurement. `None` means the probe failed and
    /// the latency becomes the unknown sentinel.
    pub async fn set_latency(&self, url: &str, latency_ms: Option<u64>) {
        let mut map = self.records.write().await;
        if let Some(record) = map.get_mut(url) {
            record.latency_ms = latency_ms.unwrap_or(UNKNOWN_LATENCY_MS);
        }
    }

    /// Record the active unit set from a successful keyset probe.
    pub async fn set_units(&self, url: &str, units: BTreeSet<String>) {
        let mut map = self.records.write().await;
        if let Some(record) = map.get_mut(url) {
            record.currency_count = units.len() as u64;
            record.units = units;
        }
    }

    /// A point-in-time copy of all records, in no particular order.
    pub async fn snapshot(&self) -> Vec<MintRecord> {
        let map = self.records.read().await;
        map.values().cloned().collect()
    }

    /// The current URL set, in no particular order.
    pub async fn urls(&self) -> Vec<String> {
        let map = self.records.read().await;
        map.keys().cloned().collect()
    }

    pub async fn get(&self, url: &str) -> Option<MintRecord> {
        let map = self.records.read().await;
        map.get(url).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
