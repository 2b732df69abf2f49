//! Pipeline driver: the five-stage deployment state machine.
//!
//! Transitions are strictly forward:
//! `INIT -> SIGNER_RESOLVED -> FACTORY_READY -> SUBMITTED -> CONFIRMED
//! -> VERIFIED -> RECORDED`, with `FAILED(stage, cause)` reachable from
//! any non-terminal state. The driver returns a typed result; turning
//! it into a process exit status is the caller's job.

use std::path::PathBuf;

use crate::{
    ContractInstance, DeployContext, DeploymentRecord, InitialContractState, PipelineError,
    StageError, artifact, probe, rpc, signer, submit,
};

/// States of the deployment pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Init,
    SignerResolved,
    FactoryReady,
    Submitted,
    Confirmed,
    Verified,
    Recorded,
}

/// Everything a successful run produced, for display and tooling.
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub signer_address: String,
    pub signer_balance: Option<String>,
    pub instance: ContractInstance,
    pub initial_state: InitialContractState,
    pub record: DeploymentRecord,
    pub record_path: PathBuf,
}

/// Run the full deployment pipeline once.
///
/// Exactly one deployment attempt per invocation: no stage retries,
/// and concurrent invocations against the same signer are unsupported
/// (they would race on the nonce and on the record file).
pub async fn deploy(ctx: &DeployContext) -> Result<DeploymentOutcome, PipelineError> {
    let client = rpc::create_client()
        .map_err(|e| fail(Stage::Init, StageError::Configuration(e)))?;

    tracing::info!(
        network = %ctx.network,
        rpc_url = %ctx.rpc_url,
        contract = %ctx.contract_name,
        "Starting TrustSync deployment..."
    );

    let signer = signer::resolve_signer(&client, ctx)
        .await
        .map_err(|e| fail(Stage::SignerResolved, e))?;
    tracing::info!(
        stage = %Stage::SignerResolved,
        address = %signer.address,
        balance_eth = signer.balance.map(signer::format_ether),
        "Deploying with account"
    );

    let deployable =
        artifact::bind_artifact(ctx, &signer).map_err(|e| fail(Stage::FactoryReady, e))?;
    tracing::info!(stage = %Stage::FactoryReady, contract = %deployable.contract_name, "Artifact bound");

    let tx_hash = submit::submit_deployment(&client, ctx, &deployable)
        .await
        .map_err(|e| fail(Stage::Submitted, e))?;
    tracing::info!(stage = %Stage::Submitted, tx_hash = %tx_hash, "Awaiting confirmation...");

    let instance = submit::await_confirmation(&client, ctx, &tx_hash)
        .await
        .map_err(|e| fail(Stage::Confirmed, e))?;
    tracing::info!(
        stage = %Stage::Confirmed,
        address = %instance.address,
        block_number = instance.block_number,
        gas_limit = instance.gas_limit,
        "Contract deployed"
    );

    let initial_state = probe::verify_initial_state(&client, ctx, &instance)
        .await
        .map_err(|e| fail(Stage::Verified, e))?;
    tracing::info!(
        stage = %Stage::Verified,
        agreement_counter = %initial_state.agreement_counter,
        reputation_reward = %initial_state.reputation_reward,
        reputation_penalty = %initial_state.reputation_penalty,
        "Initial contract state verified"
    );

    let record = DeploymentRecord::new(ctx, &signer, &instance);
    let record_path = record
        .write(&ctx.outdata)
        .map_err(|e| fail(Stage::Recorded, e))?;
    tracing::info!(stage = %Stage::Recorded, path = %record_path.display(), "Deployment complete");

    Ok(DeploymentOutcome {
        signer_address: format!("{:#x}", signer.address),
        signer_balance: signer.balance.map(signer::format_ether),
        instance,
        initial_state,
        record,
        record_path,
    })
}

fn fail(stage: Stage, source: StageError) -> PipelineError {
    PipelineError { stage, source }
}
