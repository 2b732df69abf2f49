//! Explicit deployment context passed into every pipeline stage.
//!
//! There is deliberately no ambient global configuration: everything a
//! stage needs to know about the target network, the artifact tree and
//! the output location travels through this struct.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// The default name for the trustsync configuration file.
pub const TRUSTSYNC_CONF_FILENAME: &str = "Trustsync.toml";

/// Default bound on waiting for transaction confirmation.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// Default interval between receipt polls.
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 2_000;

/// Configuration for a single deployment run.
///
/// Can be serialized to/from TOML so a run can be reproduced from a
/// checked-in `Trustsync.toml` instead of CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployContext {
    /// JSON-RPC endpoint of the target node.
    pub rpc_url: Url,
    /// Human-readable network label recorded alongside the deployment.
    pub network: String,
    /// Name of the contract to deploy (artifact lookup key).
    pub contract_name: String,
    /// Root of the compiled artifact tree (Hardhat layout).
    pub artifacts_dir: PathBuf,
    /// Directory the deployment record is written to.
    pub outdata: PathBuf,
    /// Maximum time to wait for transaction confirmation, in seconds.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// Interval between receipt polls, in milliseconds.
    #[serde(default = "default_confirmation_poll_interval_ms")]
    pub confirmation_poll_interval_ms: u64,
}

fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

fn default_confirmation_poll_interval_ms() -> u64 {
    DEFAULT_CONFIRMATION_POLL_INTERVAL_MS
}

impl DeployContext {
    /// Bound on the confirmation wait in stage 3.
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    /// Interval between receipt polls.
    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    /// Label recorded as `contractName` in the deployment record,
    /// e.g. `"TrustSync (Project.sol)"`.
    pub fn contract_label(&self) -> String {
        format!("TrustSync ({}.sol)", self.contract_name)
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deploy context to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file.
    ///
    /// Accepts either the file itself or a directory containing a
    /// `Trustsync.toml`.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(TRUSTSYNC_CONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}
