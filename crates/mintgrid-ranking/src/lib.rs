//! mintgrid-ranking — deterministic ordering of mint records.
//!
//! Two ranking modes over the same record snapshot:
//!
//! - **Weighted**: a composite score from configurable per-criterion
//!   weights (`compute_score`), descending.
//! - **Column**: a single raw field, ascending or descending.
//!
//! Both modes tie-break on the lowercased display name ascending, so the
//! ordering is total and reproducible for equal-scoring records.

pub mod scorer;
pub mod sort;
pub mod weights;

pub use scorer::{compute_score, STATUS_BIAS, UNKNOWN_LATENCY_PENALTY_MS};
pub use sort::{rank, SortColumn, SortDirection, SortMode, SortState, UnknownColumn};
pub use weights::RankWeights;
