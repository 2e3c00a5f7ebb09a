//! Composite scoring of mint records.
//!
//! `compute_score` is a pure function of a record and a weight set.
//! Components:
//! - **Status**: a constant bias for live mints that dominates everything
//!   else when the status criterion is enabled.
//! - **Activity**: mint/melt volume, discounted by the error rate. Errors
//!   only modulate activity downward — a mint with zero activity is never
//!   penalized for its error count.
//! - **Capacity**: logarithmic, diminishing returns on raw sats.
//! - **Channels / currencies**: linear.
//! - **Latency**: linear penalty; unknown latency costs a fixed
//!   1000 ms-equivalent rather than the sentinel value scaled.

use mintgrid_registry::{MintRecord, UNKNOWN_LATENCY_MS};

use crate::weights::RankWeights;

/// Score bias for live mints. Large enough that a live mint outranks any
/// dead one for every sane weight configuration.
pub const STATUS_BIAS: f64 = 1e9;

/// Latency-ms equivalent charged when no measurement exists.
pub const UNKNOWN_LATENCY_PENALTY_MS: f64 = 1000.0;

/// Compute the composite score for one record.
pub fn compute_score(record: &MintRecord, weights: &RankWeights) -> f64 {
    let mut score = 0.0;

    if weights.status && record.is_up {
        score += STATUS_BIAS;
    }

    let activity =
        record.mint_count as f64 * weights.mints + record.melt_count as f64 * weights.melts;
    if activity > 0.0 {
        let attempts = record.mint_count + record.melt_count + record.error_count;
        let error_rate = if attempts > 0 {
            record.error_count as f64 / attempts as f64
        } else {
            0.0
        };
        let penalty = error_rate * weights.errors / 100.0;
        let modulation = (1.0 - penalty).max(0.0);
        score += activity * modulation;
    }

    if record.capacity_sats > 0 {
        score += (record.capacity_sats as f64).log10() * weights.capacity;
    }

    score += record.channel_count as f64 * weights.channels;

    if record.latency_ms == UNKNOWN_LATENCY_MS {
        score -= UNKNOWN_LATENCY_PENALTY_MS * weights.latency;
    } else {
        score -= record.latency_ms as f64 * weights.latency;
    }

    score += record.currency_count as f64 * weights.currency;

    score
}
