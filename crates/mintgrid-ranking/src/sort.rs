//! Sort state and ordering of record snapshots.
//!
//! Weighted mode orders by descending composite score; column mode orders
//! by one raw field. Both tie-break on the lowercased display name
//! ascending, independent of direction, so the result is a total order.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mintgrid_registry::MintRecord;

use crate::scorer::compute_score;
use crate::weights::RankWeights;

/// A sortable column. The token form (`FromStr`) is the boundary where
/// header-click events enter the core; anything else is rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    Uptime,
    Capacity,
    Channels,
    Currencies,
    Latency,
    Mints,
    Melts,
    Errors,
}

impl SortColumn {
    /// Direction used when this column is first activated. Lower is
    /// better (or more natural) for latency, name, and errors.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortColumn::Name | SortColumn::Latency | SortColumn::Errors => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

/// A header-click token named no known column.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort column: {0:?}")]
pub struct UnknownColumn(pub String);

impl FromStr for SortColumn {
    type Err = UnknownColumn;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "name" | "url" => Ok(SortColumn::Name),
            "uptime" => Ok(SortColumn::Uptime),
            "capacity" => Ok(SortColumn::Capacity),
            "channels" => Ok(SortColumn::Channels),
            "currencies" | "units" => Ok(SortColumn::Currencies),
            "latency" => Ok(SortColumn::Latency),
            "mints" => Ok(SortColumn::Mints),
            "melts" => Ok(SortColumn::Melts),
            "errors" => Ok(SortColumn::Errors),
            other => Err(UnknownColumn(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Weighted,
    Column(SortColumn),
}

/// Current sort mode and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub mode: SortMode,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            mode: SortMode::Weighted,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Apply a header click: re-clicking the active column toggles its
    /// direction, any other column becomes active with its default
    /// direction.
    pub fn activate_column(&mut self, column: SortColumn) {
        match self.mode {
            SortMode::Column(active) if active == column => {
                self.direction = self.direction.flip();
            }
            _ => {
                self.mode = SortMode::Column(column);
                self.direction = column.default_direction();
            }
        }
    }

    /// Weight edits always return to weighted ranking.
    pub fn force_weighted(&mut self) {
        self.mode = SortMode::Weighted;
        self.direction = SortDirection::Desc;
    }
}

/// Order a record snapshot according to the sort state.
pub fn rank(records: Vec<MintRecord>, state: &SortState, weights: &RankWeights) -> Vec<MintRecord> {
    match state.mode {
        SortMode::Weighted => {
            let mut keyed: Vec<(f64, MintRecord)> = records
                .into_iter()
                .map(|record| (compute_score(&record, weights), record))
                .collect();
            keyed.sort_by(|a, b| {
                b.0.total_cmp(&a.0)
                    .then_with(|| a.1.sort_name().cmp(&b.1.sort_name()))
            });
            keyed.into_iter().map(|(_, record)| record).collect()
        }
        SortMode::Column(column) => {
            let mut records = records;
            records.sort_by(|a, b| {
                let primary = match column {
                    SortColumn::Name => a.sort_name().cmp(&b.sort_name()),
                    _ => column_value(a, column).total_cmp(&column_value(b, column)),
                };
                state
                    .direction
                    .apply(primary)
                    .then_with(|| a.sort_name().cmp(&b.sort_name()))
            });
            records
        }
    }
}

fn column_value(record: &MintRecord, column: SortColumn) -> f64 {
    match column {
        SortColumn::Name => 0.0, // Compared as text, never reaches here.
        SortColumn::Uptime => record.uptime,
        SortColumn::Capacity => record.capacity_sats as f64,
        SortColumn::Channels => record.channel_count as f64,
        SortColumn::Currencies => record.currency_count as f64,
        SortColumn::Latency => record.latency_ms as f64,
        SortColumn::Mints => record.mint_count as f64,
        SortColumn::Melts => record.melt_count as f64,
        SortColumn::Errors => record.error_count as f64,
    }
}
