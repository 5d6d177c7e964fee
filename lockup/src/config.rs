//! Orchestrator configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use velock_provider::Endpoint;

use crate::error::LockupError;

/// Configuration for one orchestrator session.
///
/// Can be loaded from a TOML file via [`LockupConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LockupConfig {
    /// The veNEAR factory contract that derives lockup account ids.
    #[serde(default = "default_venear_contract_id")]
    pub venear_contract_id: String,

    /// Ordered RPC gateway list. Empty means the built-in mainnet tiers.
    #[serde(default)]
    pub rpc_endpoints: Vec<Endpoint>,

    /// Background refresh interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Wait between a submission acknowledgment and the forced re-poll.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_venear_contract_id() -> String {
    "v.voteagora.near".to_string()
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_settle_delay_secs() -> u64 {
    3
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LockupConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, LockupError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LockupError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LockupError> {
        toml::from_str(s).map_err(|e| LockupError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("LockupConfig is always serializable to TOML")
    }

    /// The endpoint list to use: configured, or the built-in mainnet tiers.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        if self.rpc_endpoints.is_empty() {
            Endpoint::mainnet_tiers()
        } else {
            self.rpc_endpoints.clone()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for LockupConfig {
    fn default() -> Self {
        Self {
            venear_contract_id: default_venear_contract_id(),
            rpc_endpoints: Vec::new(),
            poll_interval_secs: default_poll_interval_secs(),
            settle_delay_secs: default_settle_delay_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
