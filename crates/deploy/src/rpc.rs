//! JSON-RPC plumbing shared by every pipeline stage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Bound on a single RPC round trip. Receipt polling applies its own
/// overall deadline on top of this.
const RPC_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Request id counter, so node logs can correlate the pipeline's calls.
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Build the HTTP client the pipeline reuses for all of its RPC calls.
pub fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(RPC_REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Issue one JSON-RPC request against the node and deserialize its
/// `result` field.
///
/// Node-side failures keep both the error code and the message, so
/// submission diagnostics (insufficient funds, nonce conflicts) retain
/// the node's own classification.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &Url,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let id = REQUEST_ID.fetch_add(1, Ordering::Relaxed);

    let response = client
        .post(url.clone())
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        }))
        .send()
        .await
        .with_context(|| format!("{} request to {} failed", method, url))?;

    let envelope: Value = response
        .json()
        .await
        .with_context(|| format!("{} response is not valid JSON", method))?;

    if let Some(error) = envelope.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        anyhow::bail!("RPC error {} on {}: {}", code, method, message);
    }

    let result = envelope
        .get("result")
        .with_context(|| format!("{} response carries no result", method))?
        .clone();

    serde_json::from_value(result).with_context(|| format!("unexpected {} result shape", method))
}

/// Parse a 0x-prefixed hex quantity (eth_blockNumber style) to u64.
pub fn parse_hex_u64(s: &str) -> Result<u64, anyhow::Error> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .with_context(|| format!("Failed to parse hex quantity '{}'", s))
}
