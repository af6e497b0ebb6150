//! Solana JSON-RPC client
//!
//! Minimal async client covering the calls the gateway needs: blockhash,
//! transaction submission, signature status, transaction logs and account
//! reads.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request to {method} failed: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned error {code}: {message}")]
    Node {
        method: String,
        code: i64,
        message: String,
    },
    #[error("unexpected {method} response: {detail}")]
    InvalidResponse { method: String, detail: String },
}

// ============================================================================
// COMMITMENT
// ============================================================================

/// Commitment level, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

// ============================================================================
// JSON-RPC TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashResult {
    blockhash: String,
}

/// Status of a submitted transaction as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Whether the transaction reached at least `commitment`.
    pub fn reached(&self, commitment: Commitment) -> bool {
        self.confirmation_status.unwrap_or(Commitment::Processed) >= commitment
    }
}

#[derive(Debug, Deserialize)]
struct TransactionResult {
    slot: u64,
    meta: Option<TransactionMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionMeta {
    #[serde(default)]
    err: Option<serde_json::Value>,
    #[serde(default)]
    log_messages: Option<Vec<String>>,
}

/// Outcome and logs of a landed transaction.
#[derive(Debug, Clone)]
pub struct TransactionLogs {
    pub slot: u64,
    pub err: Option<serde_json::Value>,
    pub log_messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RpcAccount {
    data: (String, String),
    owner: String,
}

/// Raw account contents.
#[derive(Debug, Clone)]
pub struct AccountData {
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct SvmRpcClient {
    client: Client,
    rpc_url: String,
    commitment: Commitment,
}

impl SvmRpcClient {
    /// Creates a new JSON-RPC client.
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - Solana RPC endpoint
    /// * `commitment` - Commitment used for reads and preflight
    pub fn new(rpc_url: &str, commitment: Commitment) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .map_err(|source| RpcError::Transport {
                method: "client builder".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            commitment,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };
        debug!("RPC {} -> {}", method, self.rpc_url);

        let transport = |source| RpcError::Transport {
            method: method.to_string(),
            source,
        };
        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        if let Some(error) = response.error {
            return Err(RpcError::Node {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result)
    }

    fn invalid(method: &str, detail: impl Into<String>) -> RpcError {
        RpcError::InvalidResponse {
            method: method.to_string(),
            detail: detail.into(),
        }
    }

    /// Fetches a recent blockhash for signing.
    pub async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        const METHOD: &str = "getLatestBlockhash";
        let params = serde_json::json!([{ "commitment": self.commitment.as_str() }]);
        let result: WithContext<BlockhashResult> = self
            .call(METHOD, params)
            .await?
            .ok_or_else(|| Self::invalid(METHOD, "missing result"))?;
        Hash::from_str(&result.value.blockhash)
            .map_err(|e| Self::invalid(METHOD, format!("bad blockhash: {e}")))
    }

    /// Submits a signed transaction and returns its signature.
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        const METHOD: &str = "sendTransaction";
        let wire = bincode::serialize(transaction)
            .map_err(|e| Self::invalid(METHOD, format!("failed to encode transaction: {e}")))?;
        let params = serde_json::json!([
            STANDARD.encode(wire),
            { "encoding": "base64", "preflightCommitment": self.commitment.as_str() }
        ]);
        let signature: String = self
            .call(METHOD, params)
            .await?
            .ok_or_else(|| Self::invalid(METHOD, "missing signature"))?;
        Signature::from_str(&signature)
            .map_err(|e| Self::invalid(METHOD, format!("bad signature: {e}")))
    }

    /// Returns the status of a signature, or None if the node has not seen it.
    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcError> {
        const METHOD: &str = "getSignatureStatuses";
        let params = serde_json::json!([
            [signature.to_string()],
            { "searchTransactionHistory": true }
        ]);
        let result: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(METHOD, params)
            .await?
            .ok_or_else(|| Self::invalid(METHOD, "missing result"))?;
        Ok(result.value.into_iter().next().flatten())
    }

    /// Returns the outcome and log lines of a landed transaction.
    pub async fn get_transaction_logs(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionLogs>, RpcError> {
        // getTransaction does not accept "processed"
        let commitment = self.commitment.max(Commitment::Confirmed);
        let params = serde_json::json!([
            signature.to_string(),
            {
                "encoding": "json",
                "commitment": commitment.as_str(),
                "maxSupportedTransactionVersion": 0
            }
        ]);
        let result: Option<TransactionResult> = self.call("getTransaction", params).await?;
        Ok(result.map(|tx| {
            let (err, log_messages) = match tx.meta {
                Some(meta) => (meta.err, meta.log_messages.unwrap_or_default()),
                None => (None, Vec::new()),
            };
            TransactionLogs {
                slot: tx.slot,
                err,
                log_messages,
            }
        }))
    }

    /// Reads an account, or None if it does not exist.
    pub async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<AccountData>, RpcError> {
        const METHOD: &str = "getAccountInfo";
        let params = serde_json::json!([
            pubkey.to_string(),
            { "encoding": "base64", "commitment": self.commitment.as_str() }
        ]);
        let Some(result) = self
            .call::<WithContext<Option<RpcAccount>>>(METHOD, params)
            .await?
        else {
            return Ok(None);
        };
        let Some(account) = result.value else {
            return Ok(None);
        };

        let owner = Pubkey::from_str(&account.owner)
            .map_err(|e| Self::invalid(METHOD, format!("bad owner: {e}")))?;
        let data = STANDARD
            .decode(&account.data.0)
            .map_err(|e| Self::invalid(METHOD, format!("bad base64 data: {e}")))?;
        Ok(Some(AccountData { owner, data }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_ordering() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
        assert_eq!(Commitment::default(), Commitment::Confirmed);
    }

    #[test]
    fn test_signature_status_reached() {
        let status: SignatureStatus = serde_json::from_value(serde_json::json!({
            "slot": 10,
            "confirmations": 0,
            "err": null,
            "confirmationStatus": "confirmed"
        }))
        .unwrap();
        assert!(status.reached(Commitment::Processed));
        assert!(status.reached(Commitment::Confirmed));
        assert!(!status.reached(Commitment::Finalized));
        assert!(status.err.is_none());
    }

    #[test]
    fn test_signature_status_with_error() {
        let status: SignatureStatus = serde_json::from_value(serde_json::json!({
            "slot": 10,
            "confirmations": null,
            "err": { "InstructionError": [0, { "Custom": 6 }] },
            "confirmationStatus": "finalized"
        }))
        .unwrap();
        assert!(status.err.is_some());
        assert!(status.reached(Commitment::Finalized));
    }
}
