//! Post-deploy state verification probes.
//!
//! The verifier depends on a statically declared set of read-only
//! accessors rather than resolving calls dynamically: a deployed
//! instance that fails any probe does not match the expected
//! interface (wrong artifact, or uninitialized contract) and the run
//! is aborted before the record is written.

use alloy_core::primitives::{U256, keccak256};
use anyhow::Context;
use serde_json::json;

use crate::{ContractInstance, DeployContext, StageError, rpc};

/// Expected agreement counter of a freshly deployed contract.
pub const EXPECTED_AGREEMENT_COUNTER: u64 = 0;
/// Reputation points awarded on agreement completion.
pub const EXPECTED_REPUTATION_REWARD: u64 = 10;
/// Reputation points deducted on agreement breach.
pub const EXPECTED_REPUTATION_PENALTY: u64 = 5;

/// A single read-only accessor probe and its expected return value.
#[derive(Debug, Clone, Copy)]
pub struct StateProbe {
    /// Display name used in logs and error messages.
    pub label: &'static str,
    /// Canonical Solidity signature the selector is derived from.
    pub signature: &'static str,
    /// Value a correctly initialized instance must return.
    pub expected: u64,
}

/// Entry point users call to join the contract. Not probed (it is a
/// state-changing call), but part of the declared interface surfaced
/// in the operator hints.
pub const REGISTER_USER_SIGNATURE: &str = "registerUser()";

/// The exact accessor surface the verifier depends on.
pub const PROBE_SET: [StateProbe; 3] = [
    StateProbe {
        label: "agreement counter",
        signature: "agreementCounter()",
        expected: EXPECTED_AGREEMENT_COUNTER,
    },
    StateProbe {
        label: "reputation reward",
        signature: "REPUTATION_REWARD()",
        expected: EXPECTED_REPUTATION_REWARD,
    },
    StateProbe {
        label: "reputation penalty",
        signature: "REPUTATION_PENALTY()",
        expected: EXPECTED_REPUTATION_PENALTY,
    },
];

/// Initial state snapshot of the deployed instance. Used only for
/// validation and display; never persisted.
#[derive(Debug, Clone)]
pub struct InitialContractState {
    pub agreement_counter: U256,
    pub reputation_reward: U256,
    pub reputation_penalty: U256,
}

/// Why a state probe rejected the deployed instance.
#[derive(Debug, thiserror::Error)]
pub enum VerificationFailure {
    /// The probe call itself failed; the deployed bytecode may not
    /// match the expected interface.
    #[error("{label} probe ({signature}) failed: {source}")]
    ProbeCall {
        label: &'static str,
        signature: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The probe answered, but not with a single 32-byte word.
    #[error("{label} probe ({signature}) returned a malformed word: {source}")]
    MalformedWord {
        label: &'static str,
        signature: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The probe answered a well-formed but wrong value; the instance
    /// did not initialize as expected.
    #[error("{label} probe ({signature}) returned {actual}, expected {expected}")]
    ValueMismatch {
        label: &'static str,
        signature: &'static str,
        expected: u64,
        actual: U256,
    },
}

/// Encode a no-argument accessor call as 0x-prefixed calldata.
pub fn encode_call(signature: &str) -> String {
    let selector = &keccak256(signature.as_bytes())[..4];
    format!("0x{}", hex::encode(selector))
}

/// Decode a single 32-byte return word into a U256.
pub fn decode_u256_word(result: &str) -> Result<U256, anyhow::Error> {
    let stripped = result.trim_start_matches("0x");
    if stripped.len() != 64 {
        anyhow::bail!(
            "expected a 32-byte return word, got {} hex chars ('{}')",
            stripped.len(),
            result
        );
    }
    U256::from_str_radix(stripped, 16)
        .with_context(|| format!("malformed return word '{}'", result))
}

/// Probe the freshly deployed instance and verify its initial state.
pub async fn verify_initial_state(
    client: &reqwest::Client,
    ctx: &DeployContext,
    instance: &ContractInstance,
) -> Result<InitialContractState, StageError> {
    let mut values = [U256::ZERO; 3];

    for (probe, value) in PROBE_SET.iter().zip(values.iter_mut()) {
        *value = run_probe(client, ctx, instance, probe)
            .await
            .map_err(StageError::Verification)?;
        tracing::debug!(probe = probe.label, value = %value, "Probe returned");
    }

    let [agreement_counter, reputation_reward, reputation_penalty] = values;
    Ok(InitialContractState {
        agreement_counter,
        reputation_reward,
        reputation_penalty,
    })
}

async fn run_probe(
    client: &reqwest::Client,
    ctx: &DeployContext,
    instance: &ContractInstance,
    probe: &StateProbe,
) -> Result<U256, VerificationFailure> {
    let result: String = rpc::json_rpc_call(
        client,
        &ctx.rpc_url,
        "eth_call",
        vec![
            json!({
                "to": format!("{:#x}", instance.address),
                "data": encode_call(probe.signature),
            }),
            json!("latest"),
        ],
    )
    .await
    .map_err(|source| VerificationFailure::ProbeCall {
        label: probe.label,
        signature: probe.signature,
        source,
    })?;

    let value = decode_u256_word(&result).map_err(|source| VerificationFailure::MalformedWord {
        label: probe.label,
        signature: probe.signature,
        source,
    })?;

    if value != U256::from(probe.expected) {
        return Err(VerificationFailure::ValueMismatch {
            label: probe.label,
            signature: probe.signature,
            expected: probe.expected,
            actual: value,
        });
    }

    Ok(value)
}
