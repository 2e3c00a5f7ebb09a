//! mintgrid-control — the configuration/state controller.
//!
//! Owns the ranking weights and sort state, and reduces discrete typed
//! control events (weight edits, header clicks, resets, dataset
//! refreshes) into state changes plus a fresh ordering. The presentation
//! layer never reaches in directly — it sends events and receives
//! orderings through a registered callback.

pub mod controller;
pub mod events;

pub use controller::{RankController, RankingCallback};
pub use events::{ControlError, ControlEvent, Criterion};
