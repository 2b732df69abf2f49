//! Signer resolution: the deploying identity and its funding balance.

use alloy_core::primitives::{Address, U256};
use anyhow::Context;
use serde_json::json;

use crate::{DeployContext, StageError, rpc};

/// The account that will authorize the deployment transaction.
///
/// Resolved once per run and never persisted. The balance is
/// informational only: a failed balance read does not abort the run,
/// but is surfaced because it often explains a later submission
/// failure.
#[derive(Debug, Clone)]
pub struct Signer {
    pub address: Address,
    pub balance: Option<U256>,
}

/// Resolve the first unlocked account exposed by the node.
pub async fn resolve_signer(
    client: &reqwest::Client,
    ctx: &DeployContext,
) -> Result<Signer, StageError> {
    let accounts: Vec<String> = rpc::json_rpc_call(client, &ctx.rpc_url, "eth_accounts", vec![])
        .await
        .map_err(StageError::Configuration)?;

    let Some(first) = accounts.first() else {
        return Err(StageError::Configuration(anyhow::anyhow!(
            "node at {} exposes no unlocked accounts",
            ctx.rpc_url
        )));
    };

    let address: Address = first
        .parse()
        .with_context(|| format!("node returned malformed account address '{}'", first))
        .map_err(StageError::Configuration)?;

    let balance = match query_balance(client, ctx, first).await {
        Ok(balance) => Some(balance),
        Err(e) => {
            tracing::warn!(
                address = %address,
                error = %e,
                "Failed to read signer balance; a later submission failure may be caused by insufficient funds"
            );
            None
        }
    };

    Ok(Signer { address, balance })
}

/// Query the signer's balance in wei.
async fn query_balance(
    client: &reqwest::Client,
    ctx: &DeployContext,
    address: &str,
) -> Result<U256, anyhow::Error> {
    let balance: String = rpc::json_rpc_call(
        client,
        &ctx.rpc_url,
        "eth_getBalance",
        vec![json!(address), json!("latest")],
    )
    .await?;

    U256::from_str_radix(balance.trim_start_matches("0x"), 16)
        .with_context(|| format!("Failed to parse balance '{}'", balance))
}

/// Format a wei amount as ETH with four decimal places, for display.
pub fn format_ether(wei: U256) -> String {
    let divisor = U256::from(10u64).pow(U256::from(18u64));
    let whole = wei / divisor;
    // Four decimal places: wei mod 1e18, scaled down to 1e-4 ETH units.
    let frac = (wei % divisor) / U256::from(10u64).pow(U256::from(14u64));
    format!("{}.{:04}", whole, frac.to::<u64>())
}
