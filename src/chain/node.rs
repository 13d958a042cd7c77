//! Full-node REST API access.
//!
//! # Responsibilities
//! - Define the [`NodeApi`] seam the vault client talks through
//! - Implement it over HTTP ([`RestNode`]) with a per-request timeout
//! - Map HTTP status codes and node error bodies to [`NodeError`]
//!
//! Wire types mirror the node's JSON: 64-bit integers travel as decimal
//! strings and byte arrays as `0x`-prefixed hex.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::chain::address::AccountAddress;

/// Errors returned by the node transport.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Invalid node URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with a non-success status.
    #[error("Node returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Ledger summary returned by the node index endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
    pub ledger_version: String,
    pub ledger_timestamp: String,
    #[serde(default)]
    pub block_height: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AccountData {
    sequence_number: String,
}

/// One on-chain resource held by an account.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AccountResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub data: Value,
}

/// Read-only function call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRequest {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

/// Entry-function payload of a user transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "entry_function_payload")]
pub struct EntryFunctionPayload {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

/// Unsigned user transaction in the node's JSON form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTransactionRequest {
    pub sender: AccountAddress,
    pub sequence_number: String,
    pub max_gas_amount: String,
    pub gas_unit_price: String,
    pub expiration_timestamp_secs: String,
    pub payload: EntryFunctionPayload,
}

/// Ed25519 signature attached to a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ed25519_signature")]
pub struct TransactionSignature {
    pub public_key: String,
    pub signature: String,
}

/// Signed user transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitTransactionRequest {
    #[serde(flatten)]
    pub transaction: UserTransactionRequest,
    pub signature: TransactionSignature,
}

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// A transaction that has been executed and committed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommittedTransaction {
    pub hash: String,
    #[serde(default)]
    pub version: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub vm_status: String,
    #[serde(default)]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

/// Lookup result for a transaction hash.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    /// Not yet committed, or not yet visible to this node.
    Pending,
    Committed(CommittedTransaction),
}

/// Operations the vault client needs from a full node.
pub trait NodeApi: Send + Sync {
    fn ledger_info(&self) -> impl Future<Output = NodeResult<LedgerInfo>> + Send;

    fn sequence_number(
        &self,
        address: &AccountAddress,
    ) -> impl Future<Output = NodeResult<u64>> + Send;

    /// Bytes the sender must sign for `request`.
    fn encode_submission(
        &self,
        request: &UserTransactionRequest,
    ) -> impl Future<Output = NodeResult<Vec<u8>>> + Send;

    fn submit(
        &self,
        request: &SubmitTransactionRequest,
    ) -> impl Future<Output = NodeResult<PendingTransaction>> + Send;

    fn transaction_by_hash(
        &self,
        hash: &str,
    ) -> impl Future<Output = NodeResult<TransactionStatus>> + Send;

    fn view(&self, request: &ViewRequest) -> impl Future<Output = NodeResult<Vec<Value>>> + Send;

    fn account_resources(
        &self,
        address: &AccountAddress,
    ) -> impl Future<Output = NodeResult<Vec<AccountResource>>> + Send;
}

/// Node error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

/// [`NodeApi`] over the node's REST endpoint.
#[derive(Clone)]
pub struct RestNode {
    http: reqwest::Client,
    base_url: String,
    timeout_duration: Duration,
}

impl RestNode {
    /// Create a node client for `rpc_url` (e.g. `https://fullnode.testnet.aptoslabs.com/v1`).
    pub fn new(rpc_url: &str, timeout_duration: Duration) -> NodeResult<Self> {
        let parsed: url::Url = rpc_url.parse().map_err(|e: url::ParseError| NodeError::InvalidUrl {
            url: rpc_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NodeError::InvalidUrl {
                url: rpc_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            timeout_duration,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> NodeResult<T> {
        self.send(self.http.get(self.endpoint(path))).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> NodeResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.post(self.endpoint(path)).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> NodeResult<T> {
        let fut = async {
            let response = request.send().await?;
            decode_response(response).await
        };
        match timeout(self.timeout_duration, fut).await {
            Ok(result) => result,
            Err(_) => Err(NodeError::Timeout(self.timeout_duration)),
        }
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> NodeResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let (message, error_code) = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) => (err.message, err.error_code),
            Err(_) => (body, None),
        };
        return Err(NodeError::Api {
            status: status.as_u16(),
            message,
            error_code,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| NodeError::Decode(e.to_string()))
}

impl NodeApi for RestNode {
    async fn ledger_info(&self) -> NodeResult<LedgerInfo> {
        self.get_json("").await
    }

    async fn sequence_number(&self, address: &AccountAddress) -> NodeResult<u64> {
        let account: AccountData = self.get_json(&format!("accounts/{}", address)).await?;
        account
            .sequence_number
            .parse()
            .map_err(|_| NodeError::Decode(format!("bad sequence number '{}'", account.sequence_number)))
    }

    async fn encode_submission(&self, request: &UserTransactionRequest) -> NodeResult<Vec<u8>> {
        let encoded: String = self.post_json("transactions/encode_submission", request).await?;
        hex::decode(encoded.trim_start_matches("0x"))
            .map_err(|e| NodeError::Decode(format!("signing message is not hex: {}", e)))
    }

    async fn submit(&self, request: &SubmitTransactionRequest) -> NodeResult<PendingTransaction> {
        self.post_json("transactions", request).await
    }

    async fn transaction_by_hash(&self, hash: &str) -> NodeResult<TransactionStatus> {
        let value: Value = match self.get_json(&format!("transactions/by_hash/{}", hash)).await {
            Ok(v) => v,
            Err(NodeError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Ok(TransactionStatus::Pending);
            }
            Err(e) => return Err(e),
        };
        parse_transaction_status(value)
    }

    async fn view(&self, request: &ViewRequest) -> NodeResult<Vec<Value>> {
        self.post_json("view", request).await
    }

    async fn account_resources(&self, address: &AccountAddress) -> NodeResult<Vec<AccountResource>> {
        self.get_json(&format!("accounts/{}/resources", address)).await
    }
}

impl std::fmt::Debug for RestNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestNode")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

/// Interpret a transaction lookup body.
pub fn parse_transaction_status(value: Value) -> NodeResult<TransactionStatus> {
    match value.get("type").and_then(Value::as_str) {
        Some("pending_transaction") => Ok(TransactionStatus::Pending),
        Some(_) => serde_json::from_value(value)
            .map(TransactionStatus::Committed)
            .map_err(|e| NodeError::Decode(e.to_string())),
        None => Err(NodeError::Decode("transaction has no type".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            RestNode::new("not a url", Duration::from_secs(1)),
            Err(NodeError::InvalidUrl { .. })
        ));
        assert!(matches!(
            RestNode::new("ftp://node.example/v1", Duration::from_secs(1)),
            Err(NodeError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_endpoint_joining() {
        let node = RestNode::new("http://localhost:8080/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(node.endpoint("view"), "http://localhost:8080/v1/view");
        assert_eq!(node.endpoint(""), "http://localhost:8080/v1/");
    }

    #[test]
    fn test_submission_json_shape() {
        let request = SubmitTransactionRequest {
            transaction: UserTransactionRequest {
                sender: AccountAddress::ONE,
                sequence_number: "7".to_string(),
                max_gas_amount: "200000".to_string(),
                gas_unit_price: "100".to_string(),
                expiration_timestamp_secs: "1700000000".to_string(),
                payload: EntryFunctionPayload {
                    function: "0x1::vault::deposit".to_string(),
                    type_arguments: vec![],
                    arguments: vec![json!("1000")],
                },
            },
            signature: TransactionSignature {
                public_key: "0xaa".to_string(),
                signature: "0xbb".to_string(),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["sequence_number"], "7");
        assert_eq!(value["payload"]["type"], "entry_function_payload");
        assert_eq!(value["payload"]["arguments"][0], "1000");
        assert_eq!(value["signature"]["type"], "ed25519_signature");
        assert_eq!(
            value["sender"],
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_parse_transaction_status() {
        let pending = json!({ "type": "pending_transaction", "hash": "0xabc" });
        assert_eq!(
            parse_transaction_status(pending).unwrap(),
            TransactionStatus::Pending
        );

        let committed = json!({
            "type": "user_transaction",
            "hash": "0xabc",
            "version": "42",
            "success": false,
            "vm_status": "Move abort",
            "gas_used": "12",
            "events": []
        });
        match parse_transaction_status(committed).unwrap() {
            TransactionStatus::Committed(tx) => {
                assert!(!tx.success);
                assert_eq!(tx.version.as_deref(), Some("42"));
                assert_eq!(tx.vm_status, "Move abort");
            }
            other => panic!("unexpected status: {:?}", other),
        }

        assert!(parse_transaction_status(json!({ "hash": "0xabc" })).is_err());
    }
}
