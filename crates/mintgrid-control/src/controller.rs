//! The control-event reducer.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use mintgrid_ranking::{rank, RankWeights, SortColumn, SortState};
use mintgrid_registry::{MintRecord, RegistryStore};

use crate::events::{ControlError, ControlEvent, Criterion};

/// Callback receiving each fresh ordering — the renderer boundary.
pub type RankingCallback = Arc<dyn Fn(Vec<MintRecord>) -> BoxFuture + Send + Sync>;

type BoxFuture = std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>;

struct ControlState {
    weights: RankWeights,
    sort: SortState,
}

/// Owns weights and sort state; reduces control events into orderings.
///
/// `Send + Sync`; share it behind an `Arc` between the event source and
/// the probe monitor's batch callback.
pub struct RankController {
    registry: RegistryStore,
    /// Name of the dataset this controller manages. Refresh events for
    /// any other dataset are ignored.
    dataset: String,
    state: Mutex<ControlState>,
    on_ranking: Option<RankingCallback>,
}

impl RankController {
    pub fn new(registry: RegistryStore, dataset: impl Into<String>) -> Self {
        Self {
            registry,
            dataset: dataset.into(),
            state: Mutex::new(ControlState {
                weights: RankWeights::default(),
                sort: SortState::default(),
            }),
            on_ranking: None,
        }
    }

    /// Start from non-default weights (config-file overrides).
    pub fn with_weights(mut self, weights: RankWeights) -> Self {
        self.state.get_mut().weights = weights;
        self
    }

    /// Register the ordering callback.
    pub fn with_ranking_callback(mut self, callback: RankingCallback) -> Self {
        self.on_ranking = Some(callback);
        self
    }

    /// Reduce one control event.
    ///
    /// Returns the fresh ordering for events that affect it, `None` for
    /// ignored events (a refresh of a foreign dataset). A rejected event
    /// leaves all state untouched.
    pub async fn apply(&self, event: ControlEvent) -> Result<Option<Vec<MintRecord>>, ControlError> {
        match event {
            ControlEvent::StatusToggled { enabled } => {
                let mut state = self.state.lock().await;
                state.weights.status = enabled;
                state.sort.force_weighted();
            }
            ControlEvent::WeightChanged { criterion, value } => {
                let mut state = self.state.lock().await;
                *weight_slot(&mut state.weights, criterion) = value;
                state.sort.force_weighted();
            }
            ControlEvent::ColumnActivated { token } => {
                let column: SortColumn = token.parse().map_err(|_| {
                    warn!(%token, "header click for unknown column ignored");
                    ControlError::UnknownColumn(token.clone())
                })?;
                let mut state = self.state.lock().await;
                state.sort.activate_column(column);
            }
            ControlEvent::DatasetRefreshed { dataset } => {
                if dataset != self.dataset {
                    debug!(%dataset, managed = %self.dataset, "foreign dataset refresh ignored");
                    return Ok(None);
                }
            }
            ControlEvent::Reset => {
                let mut state = self.state.lock().await;
                state.weights = RankWeights::default();
                state.sort = SortState::default();
            }
        }
        Ok(Some(self.rank_now().await))
    }

    /// Re-rank the current registry snapshot and notify the callback.
    ///
    /// This is also the probe monitor's batch-complete hook, so orderings
    /// refresh once per sweep instead of once per probe.
    pub async fn rank_now(&self) -> Vec<MintRecord> {
        let snapshot = self.registry.snapshot().await;
        let (weights, sort) = {
            let state = self.state.lock().await;
            (state.weights.clone(), state.sort)
        };
        let ordering = rank(snapshot, &sort, &weights);
        if let Some(callback) = &self.on_ranking {
            callback(ordering.clone()).await;
        }
        ordering
    }

    pub async fn weights(&self) -> RankWeights {
        self.state.lock().await.weights.clone()
    }

    pub async fn sort_state(&self) -> SortState {
        self.state.lock().await.sort
    }
}

fn weight_slot(weights: &mut RankWeights, criterion: Criterion) -> &mut f64 {
    match criterion {
        Criterion::Currency => &mut weights.currency,
        Criterion::Capacity => &mut weights.capacity,
        Criterion::Channels => &mut weights.channels,
        Criterion::Latency => &mut weights.latency,
        Criterion::Mints => &mut weights.mints,
        Criterion::Melts => &mut weights.melts,
        Criterion::Errors => &mut weights.errors,
    }
}
