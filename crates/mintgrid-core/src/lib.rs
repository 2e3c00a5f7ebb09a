//! mintgrid-core — configuration for MintGrid.
//!
//! Parses `mints.toml`: the managed dataset name, the seed mint list, the
//! probe policy (TTL, timeout, stagger, refresh cadence), and optional
//! ranking-weight overrides. All other crates consume the resolved types
//! from here rather than re-reading the file.

pub mod config;
pub mod duration;

pub use config::{ConfigError, MintSeed, MintsConfig, ProbeConfig, ProbePolicy, WeightOverrides};
pub use duration::parse_duration;
