//! mintgrid-registry — the endpoint record store.
//!
//! Holds the current attribute snapshot for every tracked mint, keyed by
//! URL. Two writers exist, with disjoint fields:
//!
//! - the external loader replaces whole record sets (`replace_all`);
//! - the probe monitor updates latency and unit fields in place
//!   (`set_latency`, `set_units`).
//!
//! The `RegistryStore` is `Clone` + `Send` + `Sync` (backed by an
//! `Arc<RwLock<..>>`) and can be shared across async tasks. Rankings are
//! computed from `snapshot()`, so a sort pass never observes a
//! half-replaced record set.

pub mod store;
pub mod types;

pub use store::RegistryStore;
pub use types::{LatencyClass, MintRecord, UNKNOWN_LATENCY_MS};
