//! Deployment transaction submission and confirmation.
//!
//! Submission is single-flight: a failed or timed-out transaction is
//! never resubmitted automatically, because a resubmission with the
//! same parameters can mine a second contract instance. A timeout
//! leaves a maybe-deployed state that the operator must resolve by
//! querying the chain before retrying.

use std::time::Instant;

use alloy_core::primitives::Address;
use anyhow::Context;
use serde::Deserialize;
use serde_json::json;

use crate::{DeployContext, Deployable, StageError, rpc};

/// Gas limit attached to the deployment transaction. Generous for the
/// TrustSync creation code; unused gas is refunded.
pub const DEPLOY_GAS_LIMIT: u64 = 3_000_000;

/// A confirmed on-chain contract instance. Immutable once created.
#[derive(Debug, Clone)]
pub struct ContractInstance {
    /// On-chain address of the deployed contract.
    pub address: Address,
    /// Hash of the deployment transaction.
    pub transaction_hash: String,
    /// Block the deployment transaction was included in.
    pub block_number: u64,
    /// Gas limit of the deployment transaction.
    pub gas_limit: u64,
}

/// Transaction receipt fields the pipeline cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxReceipt {
    contract_address: Option<String>,
    block_number: Option<String>,
    status: Option<String>,
}

/// Transaction fields fetched post-confirmation.
#[derive(Debug, Clone, Deserialize)]
struct TxByHash {
    gas: String,
}

/// Submit the deployment transaction with no constructor arguments.
///
/// Returns the transaction hash. Any submission failure (insufficient
/// funds, nonce conflict, RPC error) is fatal and is not retried.
pub async fn submit_deployment(
    client: &reqwest::Client,
    ctx: &DeployContext,
    deployable: &Deployable,
) -> Result<String, StageError> {
    let tx_hash: String = rpc::json_rpc_call(
        client,
        &ctx.rpc_url,
        "eth_sendTransaction",
        vec![json!({
            "from": format!("{:#x}", deployable.from),
            "data": deployable.bytecode,
            "gas": format!("0x{:x}", DEPLOY_GAS_LIMIT),
        })],
    )
    .await
    .map_err(StageError::Deployment)?;

    tracing::info!(
        tx_hash = %tx_hash,
        contract = %deployable.contract_name,
        "Deployment transaction submitted"
    );

    Ok(tx_hash)
}

/// Wait for the deployment transaction to be included in a block.
///
/// Polls `eth_getTransactionReceipt` at the configured interval with a
/// bounded overall wait. A revert, a malformed receipt, or hitting the
/// bound all fail the run.
pub async fn await_confirmation(
    client: &reqwest::Client,
    ctx: &DeployContext,
    tx_hash: &str,
) -> Result<ContractInstance, StageError> {
    let start = Instant::now();
    let max_duration = ctx.confirmation_timeout();

    let receipt = loop {
        match poll_receipt(client, ctx, tx_hash).await {
            Ok(Some(receipt)) => break receipt,
            Ok(None) => {
                tracing::trace!(tx_hash = %tx_hash, "Transaction not yet included, polling...");
            }
            Err(e) => {
                return Err(StageError::Deployment(
                    e.context("failed to poll transaction receipt"),
                ));
            }
        }

        if start.elapsed() > max_duration {
            return Err(StageError::Deployment(anyhow::anyhow!(
                "transaction {} not confirmed within {}s; it may still be mined later - query the chain before retrying, a resubmission risks a duplicate deployment",
                tx_hash,
                ctx.confirmation_timeout_secs,
            )));
        }

        tokio::time::sleep(ctx.confirmation_poll_interval()).await;
    };

    let instance = instance_from_receipt(client, ctx, tx_hash, receipt)
        .await
        .map_err(StageError::Deployment)?;

    tracing::info!(
        address = %instance.address,
        block_number = instance.block_number,
        "Deployment transaction confirmed"
    );

    Ok(instance)
}

async fn poll_receipt(
    client: &reqwest::Client,
    ctx: &DeployContext,
    tx_hash: &str,
) -> Result<Option<TxReceipt>, anyhow::Error> {
    rpc::json_rpc_call(
        client,
        &ctx.rpc_url,
        "eth_getTransactionReceipt",
        vec![json!(tx_hash)],
    )
    .await
}

async fn instance_from_receipt(
    client: &reqwest::Client,
    ctx: &DeployContext,
    tx_hash: &str,
    receipt: TxReceipt,
) -> Result<ContractInstance, anyhow::Error> {
    // Post-Byzantium receipts always carry a status field.
    if receipt.status.as_deref() == Some("0x0") {
        anyhow::bail!("deployment transaction {} reverted", tx_hash);
    }

    let address: Address = receipt
        .contract_address
        .context("confirmed receipt carries no contract address")?
        .parse()
        .context("receipt contract address is malformed")?;

    let block_number = rpc::parse_hex_u64(
        &receipt
            .block_number
            .context("confirmed receipt carries no block number")?,
    )?;

    // The record stores the transaction's gas limit, not the gas used.
    let tx: TxByHash = rpc::json_rpc_call(
        client,
        &ctx.rpc_url,
        "eth_getTransactionByHash",
        vec![json!(tx_hash)],
    )
    .await
    .context("failed to fetch confirmed transaction")?;

    Ok(ContractInstance {
        address,
        transaction_hash: tx_hash.to_string(),
        block_number,
        gas_limit: rpc::parse_hex_u64(&tx.gas)?,
    })
}
