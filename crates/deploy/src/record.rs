//! The durable deployment record consumed by downstream tooling.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{ContractInstance, DeployContext, Signer, StageError};

/// File name of the deployment record within the output directory.
pub const RECORD_FILENAME: &str = "deployment-info.json";

/// The persisted deployment record.
///
/// Written only after the deployment transaction is confirmed and the
/// instance passed state verification. A rerun overwrites the file
/// entirely; there is no merge, append, or versioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_address: String,
    pub transaction_hash: String,
    pub block_number: u64,
    pub deployer: String,
    pub network: String,
    /// ISO-8601 timestamp of the write.
    pub timestamp: String,
    pub contract_name: String,
}

impl DeploymentRecord {
    /// Assemble the record for a confirmed and verified instance.
    pub fn new(ctx: &DeployContext, signer: &Signer, instance: &ContractInstance) -> Self {
        Self {
            contract_address: format!("{:#x}", instance.address),
            transaction_hash: instance.transaction_hash.clone(),
            block_number: instance.block_number,
            deployer: format!("{:#x}", signer.address),
            network: ctx.network.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            contract_name: ctx.contract_label(),
        }
    }

    /// Write the record to `<dir>/deployment-info.json`, replacing any
    /// prior record.
    ///
    /// The write goes to a temporary file first and is renamed into
    /// place, so an interrupted run cannot leave a truncated record.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, StageError> {
        self.write_inner(dir).map_err(StageError::Persistence)
    }

    fn write_inner(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create output directory {}", dir.display()))?;

        let path = dir.join(RECORD_FILENAME);
        let tmp_path = dir.join(format!("{}.tmp", RECORD_FILENAME));

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize deployment record")?;

        std::fs::write(&tmp_path, json).context(format!(
            "Failed to write deployment record to {}",
            tmp_path.display()
        ))?;
        std::fs::rename(&tmp_path, &path).context(format!(
            "Failed to move deployment record into place at {}",
            path.display()
        ))?;

        tracing::info!(path = %path.display(), "Deployment record saved");
        Ok(path)
    }

    /// Load a record from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(format!(
            "Failed to read deployment record from {}",
            path.display()
        ))?;
        serde_json::from_str(&content).context("Failed to parse deployment record JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn test_record() -> DeploymentRecord {
        DeploymentRecord {
            contract_address: "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
            transaction_hash: "0xdeadbeef".to_string(),
            block_number: 1000,
            deployer: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string(),
            network: "goerli".to_string(),
            timestamp: "2024-01-19T12:00:00+00:00".to_string(),
            contract_name: "TrustSync (Project.sol)".to_string(),
        }
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let temp_dir = TempDir::new("trustsync-test").expect("Failed to create temp dir");
        let record = test_record();

        let path = record.write(temp_dir.path()).expect("Failed to write record");
        assert_eq!(path, temp_dir.path().join(RECORD_FILENAME));

        let loaded = DeploymentRecord::load(&path).expect("Failed to load record");
        assert_eq!(record, loaded);

        // The temporary file is gone after the rename.
        assert!(!temp_dir.path().join("deployment-info.json.tmp").exists());
    }

    #[test]
    fn test_record_field_names_match_wire_format() {
        let value = serde_json::to_value(test_record()).expect("Failed to serialize");
        let obj = value.as_object().expect("record is an object");

        let expected_keys = [
            "contractAddress",
            "transactionHash",
            "blockNumber",
            "deployer",
            "network",
            "timestamp",
            "contractName",
        ];
        assert_eq!(obj.len(), expected_keys.len());
        for key in expected_keys {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert_eq!(obj["blockNumber"], serde_json::json!(1000));
    }

    #[test]
    fn test_rewrite_overwrites_entirely() {
        let temp_dir = TempDir::new("trustsync-test").expect("Failed to create temp dir");

        let first = test_record();
        first.write(temp_dir.path()).expect("Failed to write first record");

        let second = DeploymentRecord {
            contract_address: "0x0000000000000000000000000000000000000bbb".to_string(),
            block_number: 2000,
            ..test_record()
        };
        let path = second.write(temp_dir.path()).expect("Failed to write second record");

        let loaded = DeploymentRecord::load(&path).expect("Failed to load record");
        assert_eq!(loaded, second);
        assert_ne!(loaded.contract_address, first.contract_address);
    }

    #[test]
    fn test_unwritable_path_is_persistence_error() {
        let record = test_record();
        let err = record.write(Path::new("/proc/nonexistent-dir")).unwrap_err();
        assert!(matches!(err, StageError::Persistence(_)), "{}", err);
    }
}
