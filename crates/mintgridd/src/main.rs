//! mintgridd — the MintGrid daemon.
//!
//! Single binary that assembles the subsystems:
//! - Registry (in-memory record store), seeded from `mints.toml`
//! - Probe monitor (latency + capability sweeps)
//! - Rank controller (weights, sort state, orderings)
//! - Dataset reloader (periodic re-read of the config file, standing in
//!   for an external transport refresh)
//!
//! # Usage
//!
//! ```text
//! mintgridd --config mints.toml --reload-interval 60
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use mintgrid_control::{ControlEvent, RankController};
use mintgrid_core::MintsConfig;
use mintgrid_probe::ProbeMonitor;
use mintgrid_ranking::RankWeights;
use mintgrid_registry::{MintRecord, RegistryStore};

mod render;

#[derive(Parser)]
#[command(name = "mintgridd", about = "MintGrid daemon")]
struct Cli {
    /// Path to the mint list / policy config.
    #[arg(long, default_value = "mints.toml")]
    config: PathBuf,

    /// Seconds between dataset reloads from the config file.
    #[arg(long, default_value = "60")]
    reload_interval: u64,

    /// Number of leading ranking rows to log after each update.
    #[arg(long, default_value = "10")]
    top: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mintgridd=debug,mintgrid=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("MintGrid daemon starting");

    let config = MintsConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    let policy = config.probe.resolve()?;
    let weights = config
        .weights
        .as_ref()
        .map(RankWeights::with_overrides)
        .unwrap_or_default();

    // ── Registry ───────────────────────────────────────────────────
    let registry = RegistryStore::new();
    registry.replace_all(seed_records(&config)).await;
    info!(
        mints = registry.len().await,
        dataset = %config.dataset,
        "registry seeded"
    );

    // ── Controller ─────────────────────────────────────────────────
    let top = cli.top;
    let controller = Arc::new(
        RankController::new(registry.clone(), config.dataset.clone())
            .with_weights(weights)
            .with_ranking_callback(Arc::new(move |ordering| {
                Box::pin(async move {
                    render::log_ranking(&ordering, top);
                })
            })),
    );
    info!("rank controller initialized");

    // ── Probe monitor ──────────────────────────────────────────────
    let batch_controller = controller.clone();
    let monitor = Arc::new(
        ProbeMonitor::new(registry.clone(), policy)?.with_batch_callback(Arc::new(move || {
            let controller = batch_controller.clone();
            Box::pin(async move {
                controller.rank_now().await;
            })
        })),
    );
    info!("probe monitor initialized");

    let (refresh_tx, refresh_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor_task = tokio::spawn(monitor.run(refresh_rx, shutdown_rx.clone()));
    let reload_task = tokio::spawn(reload_loop(
        cli.config.clone(),
        cli.reload_interval,
        config.dataset.clone(),
        registry,
        controller,
        refresh_tx,
        shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = monitor_task.await;
    let _ = reload_task.await;
    info!("MintGrid daemon stopped");
    Ok(())
}

fn seed_records(config: &MintsConfig) -> Vec<MintRecord> {
    config.mints.iter().map(MintRecord::from).collect()
}

/// Periodically re-read the config file and replace the record set.
///
/// Stands in for the external transport refresh: the record set is
/// swapped wholesale, the controller gets a `DatasetRefreshed` event, and
/// the probe monitor is poked for an unstaggered sweep. A reload failure
/// keeps the previous records.
async fn reload_loop(
    path: PathBuf,
    interval_secs: u64,
    dataset: String,
    registry: RegistryStore,
    controller: Arc<RankController>,
    refresh_tx: mpsc::Sender<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut tick = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The immediate first tick would duplicate the startup seeding.
    tick.tick().await;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                match MintsConfig::from_file(&path) {
                    Ok(config) => {
                        registry.replace_all(seed_records(&config)).await;
                        let event = ControlEvent::DatasetRefreshed {
                            dataset: dataset.clone(),
                        };
                        if let Err(e) = controller.apply(event).await {
                            warn!(error = %e, "dataset refresh event rejected");
                        }
                        let _ = refresh_tx.send(()).await;
                        let mints = registry.len().await;
                        debug!(mints, "dataset reloaded");
                    }
                    Err(e) => {
                        warn!(error = %e, "dataset reload failed; keeping previous records");
                    }
                }
            }
            _ = shutdown.changed() => {
                debug!("dataset reloader shutting down");
                break;
            }
        }
    }
}
