//! trustsync-deploy - one-shot deployment pipeline for the TrustSync
//! agreement/reputation contract.
//!
//! The crate drives a strictly sequential pipeline: resolve a signing
//! identity, bind the compiled contract artifact, submit and confirm
//! the deployment transaction, probe the fresh instance's initial
//! state, and persist a deployment record for downstream tooling.

mod artifact;
mod context;
mod error;
mod pipeline;
mod probe;
mod record;
pub mod rpc;
mod signer;
mod submit;

pub use artifact::{ContractArtifact, Deployable, bind_artifact};
pub use context::{
    DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_CONFIRMATION_TIMEOUT_SECS, DeployContext,
    TRUSTSYNC_CONF_FILENAME,
};
pub use error::{PipelineError, StageError};
pub use pipeline::{DeploymentOutcome, Stage, deploy};
pub use probe::{
    EXPECTED_AGREEMENT_COUNTER, EXPECTED_REPUTATION_PENALTY, EXPECTED_REPUTATION_REWARD,
    InitialContractState, PROBE_SET, REGISTER_USER_SIGNATURE, StateProbe, VerificationFailure,
    encode_call,
};
pub use record::{DeploymentRecord, RECORD_FILENAME};
pub use signer::{Signer, format_ether, resolve_signer};
pub use submit::{ContractInstance, DEPLOY_GAS_LIMIT};
