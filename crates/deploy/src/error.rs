//! Error taxonomy for the deployment pipeline.
//!
//! Every failure class except [`StageError::Persistence`] occurs strictly
//! before the deployment transaction has any assumed-safe on-chain effect,
//! so those runs can be retried once the cause is fixed. A persistence
//! failure happens *after* the contract exists on-chain and requires the
//! operator to reconcile the record file against chain state by hand.

use crate::pipeline::Stage;
use crate::probe::VerificationFailure;

/// A failure produced by one of the five pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// No usable signer, or the node could not be reached at all.
    #[error("configuration error: {0}")]
    Configuration(#[source] anyhow::Error),

    /// The compiled contract artifact is missing or empty.
    #[error("compiled artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Submission or confirmation of the deployment transaction failed.
    #[error("deployment failed: {0}")]
    Deployment(#[source] anyhow::Error),

    /// The deployed instance does not match the expected interface or
    /// initial state.
    #[error("state verification failed: {0}")]
    Verification(#[source] VerificationFailure),

    /// The deployment record could not be written to disk.
    #[error("failed to persist deployment record: {0}")]
    Persistence(#[source] anyhow::Error),
}

/// Terminal failure state of the pipeline, tagged with the stage whose
/// target state was being established when the failure occurred.
#[derive(Debug, thiserror::Error)]
#[error("deployment failed at {stage}: {source}")]
pub struct PipelineError {
    /// The stage the pipeline was transitioning into.
    pub stage: Stage,
    /// The underlying failure.
    #[source]
    pub source: StageError,
}

impl PipelineError {
    /// True when the failure occurred after the irreversible on-chain
    /// side effect (the contract already exists). The operator must
    /// manually verify that the record file matches chain state; every
    /// other failure class left no side effect behind and is safe to
    /// retry.
    pub fn requires_manual_reconciliation(&self) -> bool {
        matches!(self.source, StageError::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_is_post_side_effect() {
        let err = PipelineError {
            stage: Stage::Recorded,
            source: StageError::Persistence(anyhow::anyhow!("disk full")),
        };
        assert!(err.requires_manual_reconciliation());
    }

    #[test]
    fn test_pre_deploy_failures_are_retryable() {
        let cases = vec![
            PipelineError {
                stage: Stage::SignerResolved,
                source: StageError::Configuration(anyhow::anyhow!("no accounts")),
            },
            PipelineError {
                stage: Stage::FactoryReady,
                source: StageError::ArtifactNotFound("Project".to_string()),
            },
            PipelineError {
                stage: Stage::Submitted,
                source: StageError::Deployment(anyhow::anyhow!("insufficient funds")),
            },
            PipelineError {
                stage: Stage::Verified,
                source: StageError::Verification(VerificationFailure::ValueMismatch {
                    label: "reputation reward",
                    signature: "REPUTATION_REWARD()",
                    expected: 10,
                    actual: alloy_core::primitives::U256::from(7u64),
                }),
            },
        ];

        for err in cases {
            assert!(!err.requires_manual_reconciliation(), "{}", err);
        }
    }

    #[test]
    fn test_error_display_names_stage() {
        let err = PipelineError {
            stage: Stage::Submitted,
            source: StageError::Deployment(anyhow::anyhow!("nonce conflict")),
        };
        let msg = err.to_string();
        assert!(msg.contains("SUBMITTED"), "got: {}", msg);
        assert!(msg.contains("deployment failed"), "got: {}", msg);
    }
}
