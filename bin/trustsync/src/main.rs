//! trustsync is a CLI tool to provision the TrustSync agreement
//! contract onto an Ethereum network in one shot.

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use comfy_table::Table;

use cli::Cli;
use trustsync_deploy::{
    DeployContext, DeploymentOutcome, RECORD_FILENAME, REGISTER_USER_SIGNATURE, deploy,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    // If a config file is provided, load it; otherwise build the
    // context from CLI arguments.
    let ctx = if let Some(config_path) = &cli.config {
        let config_path = PathBuf::from(config_path);
        DeployContext::load_from_file(&config_path)?
    } else {
        DeployContext {
            rpc_url: cli.rpc_url,
            network: cli.network.to_string(),
            contract_name: cli.contract,
            artifacts_dir: cli.artifacts_dir,
            outdata: cli.outdata,
            confirmation_timeout_secs: cli.confirmation_timeout,
            confirmation_poll_interval_ms: cli.poll_interval,
        }
    };

    match deploy(&ctx).await {
        Ok(outcome) => {
            print_summary(&outcome);
            Ok(())
        }
        Err(err) => {
            if err.requires_manual_reconciliation() {
                tracing::error!(
                    stage = %err.stage,
                    "The contract is already deployed on-chain but the record could not be written; \
                     reconcile {} against chain state manually before rerunning",
                    ctx.outdata.join(RECORD_FILENAME).display()
                );
            } else {
                tracing::error!(
                    stage = %err.stage,
                    "No on-chain side effect was committed; the run is safe to retry once the cause is fixed"
                );
            }
            // Non-zero exit status; the cause chain goes to stderr.
            Err(err.into())
        }
    }
}

/// Render the post-deployment summary and operator hints.
fn print_summary(outcome: &DeploymentOutcome) {
    let mut table = Table::new();
    table
        .set_header(vec!["TrustSync deployment", ""])
        .add_row(vec![
            "Contract address",
            &outcome.record.contract_address,
        ])
        .add_row(vec![
            "Transaction hash",
            &outcome.record.transaction_hash,
        ])
        .add_row(vec![
            "Block number",
            &outcome.instance.block_number.to_string(),
        ])
        .add_row(vec!["Gas limit", &outcome.instance.gas_limit.to_string()])
        .add_row(vec!["Deployer", &outcome.signer_address])
        .add_row(vec![
            "Deployer balance (ETH)",
            outcome.signer_balance.as_deref().unwrap_or("unknown"),
        ])
        .add_row(vec!["Network", &outcome.record.network])
        .add_row(vec![
            "Agreement counter",
            &outcome.initial_state.agreement_counter.to_string(),
        ])
        .add_row(vec![
            "Reputation reward",
            &outcome.initial_state.reputation_reward.to_string(),
        ])
        .add_row(vec![
            "Reputation penalty",
            &outcome.initial_state.reputation_penalty.to_string(),
        ])
        .add_row(vec![
            "Record",
            &outcome.record_path.display().to_string(),
        ]);

    println!("{table}");

    tracing::info!("Next steps:");
    tracing::info!(
        "  1. Verify the contract: npx hardhat verify --network {} {}",
        outcome.record.network,
        outcome.record.contract_address
    );
    tracing::info!("  2. Save the contract address for frontend integration");
    tracing::info!("  3. Register users by calling {}", REGISTER_USER_SIGNATURE);
}
