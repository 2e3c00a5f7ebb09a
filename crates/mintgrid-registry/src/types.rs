//! Domain types for the mint registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use mintgrid_core::MintSeed;

/// Sentinel latency marking "no measurement yet / last probe failed".
pub const UNKNOWN_LATENCY_MS: u64 = 99_999;

/// Current attribute snapshot for a single mint, keyed by URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MintRecord {
    /// Unique identity key.
    pub url: String,
    /// Display name; empty falls back to the URL.
    pub name: String,
    pub is_up: bool,
    /// Advisory uptime fraction, not used in scoring.
    pub uptime: f64,
    /// Lightning node capacity backing this mint, in sats.
    pub capacity_sats: u64,
    /// Lightning channel count of the backing node.
    pub channel_count: u64,
    /// Number of active supported units.
    pub currency_count: u64,
    /// Active unit identifiers, as reported by the keyset probe.
    pub units: BTreeSet<String>,
    /// Round-trip latency in ms; `UNKNOWN_LATENCY_MS` means unknown.
    pub latency_ms: u64,
    pub mint_count: u64,
    pub melt_count: u64,
    pub error_count: u64,
}

impl MintRecord {
    /// A record with every counter zeroed and latency unknown.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: String::new(),
            is_up: false,
            uptime: 0.0,
            capacity_sats: 0,
            channel_count: 0,
            currency_count: 0,
            units: BTreeSet::new(),
            latency_ms: UNKNOWN_LATENCY_MS,
            mint_count: 0,
            melt_count: 0,
            error_count: 0,
        }
    }

    /// The name shown to users, falling back to the URL when unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }

    /// Lowercased display name; the deterministic tie-break key.
    pub fn sort_name(&self) -> String {
        self.display_name().to_lowercase()
    }

    pub fn latency_class(&self) -> LatencyClass {
        LatencyClass::from_millis(self.latency_ms)
    }
}

impl From<&MintSeed> for MintRecord {
    fn from(seed: &MintSeed) -> Self {
        Self {
            url: seed.url.clone(),
            name: seed.name.clone(),
            is_up: seed.is_up,
            uptime: seed.uptime,
            capacity_sats: seed.capacity_sats,
            channel_count: seed.channel_count,
            currency_count: seed.currency_count,
            units: BTreeSet::new(),
            latency_ms: seed.latency_ms.unwrap_or(UNKNOWN_LATENCY_MS),
            mint_count: seed.mint_count,
            melt_count: seed.melt_count,
            error_count: seed.error_count,
        }
    }
}

/// Semantic latency bucket for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyClass {
    /// No measurement available.
    None,
    /// ≤ 300 ms.
    Fast,
    /// ≤ 1000 ms.
    Ok,
    Slow,
}

impl LatencyClass {
    pub fn from_millis(latency_ms: u64) -> Self {
        if latency_ms == UNKNOWN_LATENCY_MS {
            LatencyClass::None
        } else if latency_ms <= 300 {
            LatencyClass::Fast
        } else if latency_ms <= 1000 {
            LatencyClass::Ok
        } else {
            LatencyClass::Slow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_zeroed_with_unknown_latency() {
        let record = MintRecord::new("https://mint.example.com");
        assert!(!record.is_up);
        assert_eq!(record.capacity_sats, 0);
        assert_eq!(record.currency_count, 0);
        assert_eq!(record.latency_ms, UNKNOWN_LATENCY_MS);
        assert!(record.units.is_empty());
    }

    #[test]
    fn display_name_falls_back_to_url() {
        let mut record = MintRecord::new("https://mint.example.com");
        assert_eq!(record.display_name(), "https://mint.example.com");

        record.name = "Example Mint".to_string();
        assert_eq!(record.display_name(), "Example Mint");
        assert_eq!(record.sort_name(), "example mint");
    }

    #[test]
    fn seed_without_latency_gets_sentinel() {
        let seed = MintSeed {
            url: "https://mint.example.com".to_string(),
            name: "Example".to_string(),
            is_up: true,
            uptime: 0.99,
            capacity_sats: 50_000,
            channel_count: 12,
            currency_count: 2,
            latency_ms: None,
            mint_count: 10,
            melt_count: 4,
            error_count: 1,
        };
        let record = MintRecord::from(&seed);
        assert_eq!(record.latency_ms, UNKNOWN_LATENCY_MS);
        assert_eq!(record.capacity_sats, 50_000);
        assert!(record.units.is_empty());
    }

    #[test]
    fn latency_class_thresholds() {
        assert_eq!(LatencyClass::from_millis(UNKNOWN_LATENCY_MS), LatencyClass::None);
        assert_eq!(LatencyClass::from_millis(0), LatencyClass::Fast);
        assert_eq!(LatencyClass::from_millis(300), LatencyClass::Fast);
        assert_eq!(LatencyClass::from_millis(301), LatencyClass::Ok);
        assert_eq!(LatencyClass::from_millis(1000), LatencyClass::Ok);
        assert_eq!(LatencyClass::from_millis(1001), LatencyClass::Slow);
    }
}
