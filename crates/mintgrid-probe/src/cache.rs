//! TTL cache with in-flight request deduplication.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tracing::trace;

struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
}

struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    /// URL → sender for the probe currently in flight. Joiners subscribe;
    /// the leader broadcasts the outcome after removing the slot.
    in_flight: HashMap<String, broadcast::Sender<Option<T>>>,
}

enum Role<T> {
    /// Run the probe ourselves.
    Lead,
    /// Await the outcome of an already-running probe.
    Join(broadcast::Receiver<Option<T>>),
}

/// Keyed probe cache: fresh entries short-circuit, concurrent requests
/// for the same key collapse into one probe.
///
/// Only successful results are cached — a failed probe is retried on the
/// very next fetch rather than freezing the failure for the TTL window.
pub struct ProbeCache<T> {
    ttl: Duration,
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> ProbeCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    /// Return a fresh cached value, join an in-flight probe, or run
    /// `probe` and publish its outcome.
    ///
    /// The in-flight slot is registered under the lock before `probe` is
    /// polled and removed under the lock before the outcome is broadcast,
    /// so the one-outstanding-probe invariant holds across any task
    /// interleaving.
    pub async fn fetch<F, Fut>(&self, url: &str, probe: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let role = {
            let mut inner = self.inner.lock().await;
            if let Some(entry) = inner.entries.get(url) {
                if entry.inserted_at.elapsed() < self.ttl {
                    trace!(%url, "probe cache hit");
                    return Some(entry.value.clone());
                }
            }
            match inner.in_flight.get(url) {
                Some(tx) => Role::Join(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    inner.in_flight.insert(url.to_string(), tx);
                    Role::Lead
                }
            }
        };

        match role {
            Role::Join(mut rx) => {
                trace!(%url, "joining in-flight probe");
                rx.recv().await.ok().flatten()
            }
            Role::Lead => {
                let result = probe().await;
                let mut inner = self.inner.lock().await;
                if let Some(value) = &result {
                    inner.entries.insert(
                        url.to_string(),
                        CacheEntry {
                            value: value.clone(),
                            inserted_at: Instant::now(),
                        },
                    );
                }
                if let Some(tx) = inner.in_flight.remove(url) {
                    // No receivers is fine — nobody joined.
                    let _ = tx.send(result.clone());
                }
                result
            }
        }
    }

    /// Drop every cached entry. In-flight probes are untouched; a late
    /// result may repopulate the cache after the clear.
    pub async fn clear(&self) {
        self.inner.lock().await.entries.clear();
    }

    /// Number of cached (not necessarily fresh) entries.
    pub async fn cached_len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}
