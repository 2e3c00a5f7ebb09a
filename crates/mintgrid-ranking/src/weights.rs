//! Per-criterion ranking weights.

use serde::{Deserialize, Serialize};

use mintgrid_core::WeightOverrides;

/// Weights for the composite score components.
///
/// All numeric weights are non-negative; the caller's input layer is
/// responsible for enforcing its own bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankWeights {
    /// When true, live mints receive a bias that dominates every other
    /// component, so they always outrank dead ones.
    pub status: bool,
    pub currency: f64,
    pub capacity: f64,
    pub channels: f64,
    pub latency: f64,
    pub mints: f64,
    pub melts: f64,
    pub errors: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            status: true,
            currency: 50.0,
            capacity: 5000.0,
            channels: 20.0,
            latency: 5.0,
            mints: 10.0,
            melts: 10.0,
            errors: 100.0,
        }
    }
}

impl RankWeights {
    /// Defaults with config-file overrides applied on top.
    pub fn with_overrides(overrides: &WeightOverrides) -> Self {
        let mut weights = Self::default();
        if let Some(status) = overrides.status {
            weights.status = status;
        }
        if let Some(currency) = overrides.currency {
            weights.currency = currency;
        }
        if let Some(capacity) = overrides.capacity {
            weights.capacity = capacity;
        }
        if let Some(channels) = overrides.channels {
            weights.channels = channels;
        }
        if let Some(latency) = overrides.latency {
            weights.latency = latency;
        }
        if let Some(mints) = overrides.mints {
            weights.mints = mints;
        }
        if let Some(melts) = overrides.melts {
            weights.melts = melts;
        }
        if let Some(errors) = overrides.errors {
            weights.errors = errors;
        }
        weights
    }
}
