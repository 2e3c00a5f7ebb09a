//! Probe monitor — keeps the registry's probe-owned fields fresh.
//!
//! `measure_all` sweeps the current endpoint set, firing both probe kinds
//! per endpoint in one spawned task each, optionally staggering kick-offs
//! to avoid bursting connections on a full refresh. `run` is the
//! background loop: a periodic tick clears the caches (policy-controlled)
//! and re-sweeps staggered; a dataset-refresh notification re-sweeps
//! immediately and unstaggered.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use mintgrid_core::ProbePolicy;
use mintgrid_registry::RegistryStore;

use crate::cache::ProbeCache;
use crate::prober::MintProber;

/// Callback invoked after a sweep settles — the re-rank boundary.
///
/// Re-sorting happens here, once per batch, rather than on every single
/// probe completion.
pub type BatchCallback = Arc<dyn Fn() -> BoxFuture + Send + Sync>;

type BoxFuture = std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>;

/// Owns the probe caches and drives sweeps over the registry.
pub struct ProbeMonitor {
    registry: RegistryStore,
    prober: MintProber,
    latency_cache: Arc<ProbeCache<u64>>,
    keyset_cache: Arc<ProbeCache<BTreeSet<String>>>,
    policy: ProbePolicy,
    on_batch_complete: Option<BatchCallback>,
}

impl ProbeMonitor {
    pub fn new(registry: RegistryStore, policy: ProbePolicy) -> anyhow::Result<Self> {
        let prober = MintProber::new(policy.timeout)?;
        Ok(Self {
            registry,
            prober,
            latency_cache: Arc::new(ProbeCache::new(policy.cache_ttl)),
            keyset_cache: Arc::new(ProbeCache::new(policy.cache_ttl)),
            policy,
            on_batch_complete: None,
        })
    }

    /// Set the callback fired when a sweep settles.
    pub fn with_batch_callback(mut self, callback: BatchCallback) -> Self {
        self.on_batch_complete = Some(callback);
        self
    }

    /// Probe every registered endpoint and wait for all probes to settle.
    ///
    /// When `staggered`, successive endpoint kick-offs are spaced by the
    /// policy's stagger delay; the delay shifts kick-off time only, not
    /// completion order. Failures are isolated per endpoint and per probe
    /// kind.
    pub async fn measure_all(&self, staggered: bool) {
        let urls = self.registry.urls().await;
        debug!(endpoints = urls.len(), staggered, "probe sweep starting");

        let mut handles = Vec::with_capacity(urls.len());
        for (index, url) in urls.into_iter().enumerate() {
            if staggered && index > 0 {
                tokio::time::sleep(self.policy.stagger).await;
            }
            let registry = self.registry.clone();
            let prober = self.prober.clone();
            let latency_cache = self.latency_cache.clone();
            let keyset_cache = self.keyset_cache.clone();
            handles.push(tokio::spawn(async move {
                probe_one(&registry, &prober, &latency_cache, &keyset_cache, &url).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }

        if let Some(callback) = &self.on_batch_complete {
            callback().await;
        }
    }

    /// Background refresh loop.
    ///
    /// Terminates when the shutdown watch fires or the refresh channel
    /// closes. In-flight probes are not cancelled by a tick's cache
    /// clear; their late results may repopulate the cache.
    pub async fn run(
        self: Arc<Self>,
        mut refresh: mpsc::Receiver<()>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut tick = tokio::time::interval(self.policy.refresh_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval = ?self.policy.refresh_interval,
            full_invalidation = self.policy.full_invalidation,
            "probe monitor started"
        );

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if self.policy.full_invalidation {
                        self.latency_cache.clear().await;
                        self.keyset_cache.clear().await;
                    }
                    self.measure_all(true).await;
                }
                notice = refresh.recv() => match notice {
                    Some(()) => {
                        debug!("dataset refresh — unstaggered sweep");
                        self.measure_all(false).await;
                    }
                    None => break,
                },
                _ = shutdown.changed() => {
                    debug!("probe monitor shutting down");
                    break;
                }
            }
        }
    }
}

/// Fire both probe kinds for one endpoint and write the results back.
async fn probe_one(
    registry: &RegistryStore,
    prober: &MintProber,
    latency_cache: &ProbeCache<u64>,
    keyset_cache: &ProbeCache<BTreeSet<String>>,
    url: &str,
) {
    let (latency, units) = tokio::join!(
        latency_cache.fetch(url, || prober.probe_info(url)),
        keyset_cache.fetch(url, || prober.probe_keysets(url)),
    );

    registry.set_latency(url, latency).await;
    // A failed capability probe keeps the previously-known unit set.
    if let Some(units) = units {
        registry.set_units(url, units).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use mintgrid_registry::{MintRecord, UNKNOWN_LATENCY_MS};

    fn test_policy() -> ProbePolicy {
        ProbePolicy {
            cache_ttl: Duration::from_secs(10),
            timeout: Duration::from_millis(500),
            stagger: Duration::from_millis(5),
            refresh_interval: Duration::from_secs(15),
            full_invalidation: true,
        }
    }

    /// A minimal mint: answers /v1/info with 200 and /v1/keysets with a
    /// two-unit listing, for any number of connections.
    async fn spawn_mint_fixture() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let body = if request.starts_with("GET /v1/keysets") {
                        r#"{"keysets":[{"active":true,"unit":"sat"},{"active":true,"unit":"usd"},{"active":false,"unit":"eur"}]}"#
                    } else {
                        "{}"
                    };
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    async fn seeded_registry(urls: &[&str]) -> RegistryStore {
        let registry = RegistryStore::new();
        registry
            .replace_all(urls.iter().map(|u| MintRecord::new(*u)).collect())
            .await;
        registry
    }

    #[tokio::test]
    async fn sweep_updates_latency_and_units() {
        let base = spawn_mint_fixture().await;
        let registry = seeded_registry(&[&base]).await;
        let monitor = ProbeMonitor::new(registry.clone(), test_policy()).unwrap();

        monitor.measure_all(false).await;

        let record = registry.get(&base).await.unwrap();
        assert_ne!(record.latency_ms, UNKNOWN_LATENCY_MS);
        assert_eq!(record.currency_count, 2);
        assert!(record.units.contains("sat"));
        assert!(record.units.contains("usd"));
        assert!(!record.units.contains("eur"));
    }

    #[tokio::test]
    async fn sweep_marks_unreachable_endpoints_unknown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let dead = format!("http://{addr}");

        let registry = seeded_registry(&[&dead]).await;
        // Pretend a previous sweep measured it.
        registry.set_latency(&dead, Some(80)).await;

        let monitor = ProbeMonitor::new(registry.clone(), test_policy()).unwrap();
        monitor.measure_all(false).await;

        let record = registry.get(&dead).await.unwrap();
        assert_eq!(record.latency_ms, UNKNOWN_LATENCY_MS);
    }

    #[tokio::test]
    async fn failing_endpoint_does_not_abort_siblings() {
        let live = spawn_mint_fixture().await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let dead = format!("http://{addr}");

        let registry = seeded_registry(&[&live, &dead]).await;
        let monitor = ProbeMonitor::new(registry.clone(), test_policy()).unwrap();
        monitor.measure_all(true).await;

        assert_ne!(
            registry.get(&live).await.unwrap().latency_ms,
            UNKNOWN_LATENCY_MS
        );
        assert_eq!(
            registry.get(&dead).await.unwrap().latency_ms,
            UNKNOWN_LATENCY_MS
        );
    }

    #[tokio::test]
    async fn batch_callback_fires_once_per_sweep() {
        let registry = seeded_registry(&[]).await;
        let batches = Arc::new(AtomicUsize::new(0));
        let counter = batches.clone();

        let monitor = ProbeMonitor::new(registry, test_policy())
            .unwrap()
            .with_batch_callback(Arc::new(move || {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            }));

        monitor.measure_all(false).await;
        monitor.measure_all(true).await;
        assert_eq!(batches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn run_terminates_on_shutdown() {
        let registry = seeded_registry(&[]).await;
        let monitor = Arc::new(ProbeMonitor::new(registry, test_policy()).unwrap());

        let (_refresh_tx, refresh_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(monitor.run(refresh_rx, shutdown_rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("run loop must stop on shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn refresh_notification_triggers_sweep() {
        let base = spawn_mint_fixture().await;
        let registry = seeded_registry(&[&base]).await;
        let batches = Arc::new(AtomicUsize::new(0));
        let counter = batches.clone();

        let mut policy = test_policy();
        // Keep the periodic tick out of the way after its immediate first
        // firing.
        policy.refresh_interval = Duration::from_secs(3600);

        let monitor = Arc::new(
            ProbeMonitor::new(registry.clone(), policy)
                .unwrap()
                .with_batch_callback(Arc::new(move || {
                    let counter = counter.clone();
                    Box::pin(async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                })),
        );

        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(monitor.run(refresh_rx, shutdown_rx));

        // First interval tick sweeps immediately (batch 1), then the
        // refresh notification forces another sweep (batch 2).
        refresh_tx.send(()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(batches.load(Ordering::SeqCst) >= 2);

        shutdown_tx.send(true).unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
    }
}
