//! mintgrid-probe — asynchronous health and capability probes.
//!
//! Keeps per-mint liveness/latency/unit data fresh with bounded network
//! traffic. Three layers:
//!
//! ```text
//! ProbeMonitor
//!   ├── measure_all(): staggered sweep, one task per endpoint
//!   │     └── ProbeCache<T>: TTL cache + in-flight single-flight
//!   │           └── MintProber: GET /v1/info, GET /v1/keysets
//!   └── run(): periodic re-verification + dataset-refresh reaction
//! ```
//!
//! # Dedup invariant
//!
//! At most one outstanding probe per URL per probe kind exists at any
//! time. A caller that finds a probe in flight attaches to its outcome
//! instead of issuing a duplicate; a caller that finds a fresh cache
//! entry issues no network activity at all.
//!
//! Probe failures are values (`None`), never errors: a failed probe
//! degrades the record to "unknown" and is retried on the next cache
//! miss. One failing endpoint never aborts its siblings in a sweep.

pub mod cache;
pub mod monitor;
pub mod prober;

pub use cache::ProbeCache;
pub use monitor::{BatchCallback, ProbeMonitor};
pub use prober::MintProber;
