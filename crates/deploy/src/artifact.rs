//! Contract artifact lookup and signer binding.
//!
//! The factory stage makes no network calls: a missing or empty
//! artifact must abort the run before any transaction is attempted.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{DeployContext, Signer, StageError};

/// A compiled contract artifact as produced by a Hardhat build
/// (`artifacts/contracts/<Name>.sol/<Name>.json`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: serde_json::Value,
    pub bytecode: String,
}

/// A contract artifact bound to a signer, ready for submission.
#[derive(Debug, Clone)]
pub struct Deployable {
    /// The account that will send the deployment transaction.
    pub from: alloy_core::primitives::Address,
    /// The contract name the artifact was looked up by.
    pub contract_name: String,
    /// 0x-prefixed creation bytecode.
    pub bytecode: String,
}

/// Candidate locations for the compiled artifact, in lookup order.
fn artifact_candidates(ctx: &DeployContext) -> [PathBuf; 2] {
    let name = &ctx.contract_name;
    [
        // Hardhat build tree
        ctx.artifacts_dir
            .join("contracts")
            .join(format!("{}.sol", name))
            .join(format!("{}.json", name)),
        // Flat layout
        ctx.artifacts_dir.join(format!("{}.json", name)),
    ]
}

/// Locate the compiled artifact for the configured contract and bind
/// it to the resolved signer.
pub fn bind_artifact(ctx: &DeployContext, signer: &Signer) -> Result<Deployable, StageError> {
    let candidates = artifact_candidates(ctx);

    let Some(path) = candidates.iter().find(|p| p.exists()) else {
        return Err(StageError::ArtifactNotFound(format!(
            "no artifact for contract '{}' under {} (tried {}) - was the contract compiled?",
            ctx.contract_name,
            ctx.artifacts_dir.display(),
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )));
    };

    let content = std::fs::read_to_string(path).map_err(|e| {
        StageError::ArtifactNotFound(format!("failed to read {}: {}", path.display(), e))
    })?;

    let artifact: ContractArtifact = serde_json::from_str(&content).map_err(|e| {
        StageError::ArtifactNotFound(format!(
            "{} is not a valid contract artifact: {}",
            path.display(),
            e
        ))
    })?;

    let stripped = artifact.bytecode.trim_start_matches("0x");
    if stripped.is_empty() {
        return Err(StageError::ArtifactNotFound(format!(
            "artifact {} contains no creation bytecode - was the contract compiled?",
            path.display()
        )));
    }

    let code = hex::decode(stripped).map_err(|e| {
        StageError::ArtifactNotFound(format!(
            "artifact {} contains malformed bytecode hex: {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!(
        contract = %artifact.contract_name,
        path = %path.display(),
        bytecode_bytes = code.len(),
        "Bound contract artifact to signer"
    );

    Ok(Deployable {
        from: signer.address,
        contract_name: artifact.contract_name,
        bytecode: artifact.bytecode,
    })
}
