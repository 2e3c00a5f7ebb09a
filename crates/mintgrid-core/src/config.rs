//! mints.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::duration::parse_duration;

/// Errors raised while loading or resolving configuration.
///
/// These are the only fatal errors in the system — everything downstream
/// of startup degrades instead of failing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration string for {field}: {value:?}")]
    BadDuration { field: &'static str, value: String },
}

/// Top-level `mints.toml` structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintsConfig {
    /// Name of the managed dataset. Refresh events naming a different
    /// dataset are ignored by the controller.
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// Probe policy. All fields have fixed defaults.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Optional ranking-weight overrides applied at startup.
    pub weights: Option<WeightOverrides>,
    /// Seed mint records.
    #[serde(default)]
    pub mints: Vec<MintSeed>,
}

fn default_dataset() -> String {
    "mints".to_string()
}

impl MintsConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: MintsConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Probe policy as written in the config file (duration strings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Freshness window for cached probe results.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,
    /// Per-probe timeout; a probe past this is aborted and failed.
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Delay between successive endpoint kick-offs in a staggered sweep.
    #[serde(default = "default_stagger")]
    pub stagger: String,
    /// Cadence of the periodic re-verification sweep.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
    /// Whether the periodic sweep clears both caches entirely, forcing
    /// every endpoint to be re-verified rather than trusting the TTL.
    #[serde(default = "default_true")]
    pub full_invalidation: bool,
}

fn default_cache_ttl() -> String {
    "10s".to_string()
}

fn default_timeout() -> String {
    "5s".to_string()
}

fn default_stagger() -> String {
    "100ms".to_string()
}

fn default_refresh_interval() -> String {
    "15s".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cache_ttl: default_cache_ttl(),
            timeout: default_timeout(),
            stagger: default_stagger(),
            refresh_interval: default_refresh_interval(),
            full_invalidation: true,
        }
    }
}

impl ProbeConfig {
    /// Resolve duration strings into a concrete policy.
    pub fn resolve(&self) -> Result<ProbePolicy, ConfigError> {
        Ok(ProbePolicy {
            cache_ttl: resolve_field("probe.cache_ttl", &self.cache_ttl)?,
            timeout: resolve_field("probe.timeout", &self.timeout)?,
            stagger: resolve_field("probe.stagger", &self.stagger)?,
            refresh_interval: resolve_field("probe.refresh_interval", &self.refresh_interval)?,
            full_invalidation: self.full_invalidation,
        })
    }
}

fn resolve_field(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_duration(value).ok_or_else(|| ConfigError::BadDuration {
        field,
        value: value.to_string(),
    })
}

/// Resolved probe policy consumed by the probe monitor.
#[derive(Debug, Clone)]
pub struct ProbePolicy {
    pub cache_ttl: Duration,
    pub timeout: Duration,
    pub stagger: Duration,
    pub refresh_interval: Duration,
    pub full_invalidation: bool,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            stagger: Duration::from_millis(100),
            refresh_interval: Duration::from_secs(15),
            full_invalidation: true,
        }
    }
}

/// Ranking-weight overrides. Absent fields keep the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightOverrides {
    pub status: Option<bool>,
    pub currency: Option<f64>,
    pub capacity: Option<f64>,
    pub channels: Option<f64>,
    pub latency: Option<f64>,
    pub mints: Option<f64>,
    pub melts: Option<f64>,
    pub errors: Option<f64>,
}

/// One seed entry of the managed mint list.
///
/// Every counter defaults to 0 and latency to unknown, so a bare
/// `url = "..."` line is a valid record source. A listed mint is presumed
/// reachable until the loader says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintSeed {
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_up: bool,
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub capacity_sats: u64,
    #[serde(default)]
    pub channel_count: u64,
    #[serde(default)]
    pub currency_count: u64,
    /// Known average latency, if the loader has one. Absent means unknown.
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub mint_count: u64,
    #[serde(default)]
    pub melt_count: u64,
    #[serde(default)]
    pub error_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let file = write_config(
            r#"
            [[mints]]
            url = "https://mint.example.com"
            "#,
        );
        let config = MintsConfig::from_file(file.path()).unwrap();

        assert_eq!(config.dataset, "mints");
        assert_eq!(config.mints.len(), 1);
        let seed = &config.mints[0];
        assert_eq!(seed.url, "https://mint.example.com");
        assert!(seed.name.is_empty());
        assert!(seed.is_up);
        assert_eq!(seed.capacity_sats, 0);
        assert_eq!(seed.latency_ms, None);

        let policy = config.probe.resolve().unwrap();
        assert_eq!(policy.cache_ttl, Duration::from_secs(10));
        assert_eq!(policy.timeout, Duration::from_secs(5));
        assert_eq!(policy.stagger, Duration::from_millis(100));
        assert_eq!(policy.refresh_interval, Duration::from_secs(15));
        assert!(policy.full_invalidation);
    }

    #[test]
    fn probe_policy_overrides() {
        let file = write_config(
            r#"
            dataset = "testnet-mints"

            [probe]
            cache_ttl = "30s"
            stagger = "250ms"
            full_invalidation = false
            "#,
        );
        let config = MintsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dataset, "testnet-mints");

        let policy = config.probe.resolve().unwrap();
        assert_eq!(policy.cache_ttl, Duration::from_secs(30));
        assert_eq!(policy.stagger, Duration::from_millis(250));
        // Unset fields keep defaults.
        assert_eq!(policy.timeout, Duration::from_secs(5));
        assert!(!policy.full_invalidation);
    }

    #[test]
    fn bad_duration_is_rejected() {
        let file = write_config(
            r#"
            [probe]
            cache_ttl = "whenever"
            "#,
        );
        let config = MintsConfig::from_file(file.path()).unwrap();
        let err = config.probe.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::BadDuration { field, .. } if field == "probe.cache_ttl"));
    }

    #[test]
    fn weight_overrides_parse() {
        let file = write_config(
            r#"
            [weights]
            status = false
            latency = 12.5
            "#,
        );
        let config = MintsConfig::from_file(file.path()).unwrap();
        let weights = config.weights.unwrap();
        assert_eq!(weights.status, Some(false));
        assert_eq!(weights.latency, Some(12.5));
        assert_eq!(weights.capacity, None);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let file = write_config("mints = not-a-list");
        assert!(matches!(
            MintsConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
