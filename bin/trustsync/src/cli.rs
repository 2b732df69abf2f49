use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use trustsync_deploy::{DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_CONFIRMATION_TIMEOUT_SECS};
use url::Url;

/// Known deployment targets, recorded as the network label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Network {
    Localhost,
    Goerli,
    Sepolia,
    Mainnet,
    #[strum(default)]
    Custom(String),
}

#[derive(Parser)]
#[command(name = "trustsync")]
#[command(
    author,
    version,
    about = "Deploy the TrustSync agreement contract and record the outcome"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "TRUSTSYNC_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// JSON-RPC endpoint of the target node. The node must expose an
    /// unlocked account to deploy from.
    #[arg(long, alias = "rpc", env = "TRUSTSYNC_RPC_URL", default_value = "http://localhost:8545")]
    pub rpc_url: Url,

    /// Network label written into the deployment record.
    #[arg(short, long, env = "TRUSTSYNC_NETWORK", default_value_t = Network::Localhost)]
    pub network: Network,

    /// Name of the contract whose compiled artifact will be deployed.
    #[arg(long, env = "TRUSTSYNC_CONTRACT", default_value = "Project")]
    pub contract: String,

    /// Root of the compiled artifact tree (Hardhat layout).
    #[arg(long, env = "TRUSTSYNC_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Directory the deployment record is written to.
    #[arg(long, env = "TRUSTSYNC_OUTDATA", default_value = ".")]
    pub outdata: PathBuf,

    /// Maximum time to wait for transaction confirmation, in seconds.
    #[arg(long, env = "TRUSTSYNC_CONFIRMATION_TIMEOUT", default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS)]
    pub confirmation_timeout: u64,

    /// Interval between confirmation polls, in milliseconds.
    #[arg(long, env = "TRUSTSYNC_POLL_INTERVAL", default_value_t = DEFAULT_CONFIRMATION_POLL_INTERVAL_MS)]
    pub poll_interval: u64,

    /// Path to an existing Trustsync.toml configuration file to load.
    ///
    /// When provided, the deployment uses the configuration from this
    /// file instead of the CLI arguments above.
    #[arg(long, alias = "conf", env = "TRUSTSYNC_CONFIG")]
    pub config: Option<String>,
}
