//! Control events and their rejection errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A numeric ranking criterion whose weight can be edited.
///
/// The status criterion is a toggle, not a weight, and has its own event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Currency,
    Capacity,
    Channels,
    Latency,
    Mints,
    Melts,
    Errors,
}

/// Discrete inputs delivered to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlEvent {
    /// Enable/disable the live-mints-first status bias.
    StatusToggled { enabled: bool },
    /// A numeric weight edit. Bounds are the input layer's concern; the
    /// controller takes the value as-is.
    WeightChanged { criterion: Criterion, value: f64 },
    /// A column-header activation, carrying the raw column-key token.
    ColumnActivated { token: String },
    /// The external loader replaced a dataset's record set.
    DatasetRefreshed { dataset: String },
    /// Restore default weights and weighted/descending sort.
    Reset,
}

/// Rejected control inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    /// The header token named no known column. The sort mode is left
    /// unchanged.
    #[error("unknown sort column: {0:?}")]
    UnknownColumn(String),
}
