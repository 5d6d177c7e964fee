//! RPC endpoint descriptors with per-endpoint retry policy.
//!
//! Endpoints are tried strictly in list order. Public mainnet gateways vary
//! widely in capacity and rate limits, so the retry budget and backoff are
//! configured per endpoint rather than globally.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One RPC gateway and its retry policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,

    /// Attempts against this endpoint before failing over to the next.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Multiplier applied to the wait between successive attempts.
    #[serde(default = "default_backoff")]
    pub backoff: u32,

    /// Wait before the first retry, in milliseconds.
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,
}

fn default_retries() -> u32 {
    3
}

fn default_backoff() -> u32 {
    2
}

fn default_wait_ms() -> u64 {
    1000
}

impl Endpoint {
    pub fn new(url: impl Into<String>, retries: u32, backoff: u32, wait_ms: u64) -> Self {
        Self {
            url: url.into(),
            retries,
            backoff,
            wait_ms,
        }
    }

    /// Wait before retry `attempt` (0-based): `wait_ms * backoff^attempt`.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.backoff).saturating_pow(attempt);
        Duration::from_millis(self.wait_ms.saturating_mul(factor))
    }

    /// The built-in mainnet gateway list, ordered by observed capacity:
    /// unmetered gateways first with aggressive retries, strictly
    /// rate-limited ones last as a final resort.
    pub fn mainnet_tiers() -> Vec<Endpoint> {
        vec![
            // Tier 1: unmetered
            Endpoint::new("https://free.rpc.fastnear.com", 5, 2, 1000),
            Endpoint::new("https://near.lava.build:443", 5, 2, 1000),
            Endpoint::new("https://near.rpc.grove.city/v1/01fdb492", 5, 2, 1000),
            // Tier 2: high capacity
            Endpoint::new("https://near.drpc.org", 4, 2, 1000),
            Endpoint::new("https://near.blockpi.network/v1/rpc/public", 4, 2, 1000),
            // Tier 3: moderate capacity
            Endpoint::new("https://1rpc.io/near", 3, 2, 1500),
            // Tier 4: unknown capacity
            Endpoint::new(
                "https://endpoints.omniatech.io/v1/near/mainnet/public",
                2,
                3,
                2000,
            ),
            Endpoint::new("https://rpc.intea.rs", 2, 3, 2000),
            // Tier 5: strict rate limits, last resort
            Endpoint::new("https://near-mainnet.gateway.tatum.io/", 1, 4, 5000),
        ]
    }
}
