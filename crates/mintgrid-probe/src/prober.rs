//! HTTP probes against mint endpoints.
//!
//! Two probe kinds share one client:
//! - liveness/latency: `GET <base>/v1/info`, any HTTP-success status
//!   counts, the value is the round-trip time;
//! - capability: `GET <base>/v1/keysets`, the value is the set of unit
//!   identifiers of entries marked active.
//!
//! Every failure mode — connect error, timeout, non-success status,
//! unparsable body — yields `None`.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

/// Wire shape of the keysets listing.
#[derive(Debug, Deserialize)]
struct KeysetsResponse {
    #[serde(default)]
    keysets: Vec<KeysetEntry>,
}

#[derive(Debug, Deserialize)]
struct KeysetEntry {
    #[serde(default)]
    active: bool,
    #[serde(default)]
    unit: Option<String>,
}

/// Issues liveness and capability probes over a shared HTTP client.
#[derive(Clone)]
pub struct MintProber {
    http: reqwest::Client,
}

impl MintProber {
    /// Build a prober whose requests abort after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("mintgrid/0.1")
            .build()
            .context("failed to build probe HTTP client")?;
        Ok(Self { http })
    }

    /// Measure round-trip latency of the info endpoint.
    pub async fn probe_info(&self, base_url: &str) -> Option<u64> {
        let url = endpoint(base_url, "/v1/info");
        let started = Instant::now();
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                Some(started.elapsed().as_millis() as u64)
            }
            Ok(response) => {
                debug!(status = %response.status(), %url, "info probe non-success");
                None
            }
            Err(e) => {
                debug!(error = %e, %url, "info probe failed");
                None
            }
        }
    }

    /// Fetch the deduplicated set of active units from the keyset listing.
    pub async fn probe_keysets(&self, base_url: &str) -> Option<BTreeSet<String>> {
        let url = endpoint(base_url, "/v1/keysets");
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, %url, "keyset probe failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), %url, "keyset probe non-success");
            return None;
        }
        let body: KeysetsResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, %url, "keyset response unparsable");
                return None;
            }
        };
        Some(
            body.keysets
                .into_iter()
                .filter(|keyset| keyset.active)
                .filter_map(|keyset| keyset.unit)
                .collect(),
        )
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
