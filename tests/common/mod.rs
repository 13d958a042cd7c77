//! Shared utilities for integration tests: an in-process mock full node.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use vault_dashboard::chain::ChainConfig;

/// Throwaway signer key used only by tests.
pub const TEST_PRIVATE_KEY: &str =
    "ed25519-priv-0x9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

pub const COIN_STORE: &str = "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>";

/// Programmable node behaviour.
pub struct MockNodeState {
    /// View results keyed by bare function name.
    pub views: Mutex<HashMap<String, Value>>,
    /// Resource lists keyed by long-form address.
    pub resources: Mutex<HashMap<String, Value>>,
    /// Lookup count at which a submitted transaction commits; `None` never commits.
    pub commit_after: Mutex<Option<u32>>,
    pub commit_success: Mutex<bool>,
    pub lookups: AtomicU32,
    pub submitted: Mutex<Vec<Value>>,
}

impl MockNodeState {
    pub fn vault(assets: u64, shares: u64, token: &str, initialized: bool) -> Arc<Self> {
        let mut views = HashMap::new();
        views.insert("total_assets".to_string(), json!([assets.to_string()]));
        views.insert("total_shares".to_string(), json!([shares.to_string()]));
        views.insert("get_asset_token".to_string(), json!([token]));
        views.insert("is_initialized".to_string(), json!([initialized]));

        Arc::new(Self {
            views: Mutex::new(views),
            resources: Mutex::new(HashMap::new()),
            commit_after: Mutex::new(Some(2)),
            commit_success: Mutex::new(true),
            lookups: AtomicU32::new(0),
            submitted: Mutex::new(Vec::new()),
        })
    }

    pub fn set_view(&self, name: &str, result: Value) {
        self.views.lock().unwrap().insert(name.to_string(), result);
    }

    pub fn clear_views(&self) {
        self.views.lock().unwrap().clear();
    }

    pub fn set_balance(&self, address: &str, octas: u64) {
        let resources = json!([
            { "type": "0x1::account::Account", "data": { "sequence_number": "0" } },
            { "type": COIN_STORE, "data": { "coin": { "value": octas.to_string() }, "frozen": false } }
        ]);
        self.resources
            .lock()
            .unwrap()
            .insert(address.to_string(), resources);
    }
}

fn not_found(message: &str, code: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": message, "error_code": code })),
    )
        .into_response()
}

async fn ledger_info() -> Json<Value> {
    Json(json!({
        "chain_id": 4,
        "epoch": "1",
        "ledger_version": "1000",
        "ledger_timestamp": "1700000000000000",
        "block_height": "500"
    }))
}

async fn account(Path(address): Path<String>) -> Json<Value> {
    Json(json!({ "sequence_number": "3", "authentication_key": address }))
}

async fn resources(
    State(state): State<Arc<MockNodeState>>,
    Path(address): Path<String>,
) -> Response {
    match state.resources.lock().unwrap().get(&address) {
        Some(list) => Json(list.clone()).into_response(),
        None => not_found("Account not found", "account_not_found"),
    }
}

async fn view(State(state): State<Arc<MockNodeState>>, Json(body): Json<Value>) -> Response {
    let function = body["function"].as_str().unwrap_or_default().to_string();
    let name = function.rsplit("::").next().unwrap_or_default();
    match state.views.lock().unwrap().get(name) {
        Some(result) => Json(result.clone()).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": format!("Function {} does not exist", function),
                "error_code": "invalid_input"
            })),
        )
            .into_response(),
    }
}

async fn encode_submission(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!("0xb5e97db07fa0bd0e5598aa3643a9bc6f6693bddc1a9fec9e674a461eaa00b193"))
}

async fn submit(State(state): State<Arc<MockNodeState>>, Json(body): Json<Value>) -> Response {
    state.submitted.lock().unwrap().push(body);
    (
        StatusCode::ACCEPTED,
        Json(json!({ "hash": "0x5ee1", "sender": "0x1" })),
    )
        .into_response()
}

async fn by_hash(State(state): State<Arc<MockNodeState>>, Path(hash): Path<String>) -> Response {
    let lookups = state.lookups.fetch_add(1, Ordering::SeqCst) + 1;
    let commit_after = *state.commit_after.lock().unwrap();

    match commit_after {
        Some(n) if lookups >= n => {
            let success = *state.commit_success.lock().unwrap();
            Json(json!({
                "type": "user_transaction",
                "hash": hash,
                "version": "1001",
                "success": success,
                "vm_status": if success { "Executed successfully" } else { "Move abort: E_INSUFFICIENT_SHARES" },
                "gas_used": "15",
                "events": [{ "type": "0xcafe::vault::DepositEvent", "data": { "amount": "1000" } }]
            }))
            .into_response()
        }
        _ if lookups == 1 => not_found("Transaction not found", "transaction_not_found"),
        _ => Json(json!({ "type": "pending_transaction", "hash": hash })).into_response(),
    }
}

/// Start the mock node on an ephemeral port and return its address.
pub async fn start_mock_node(state: Arc<MockNodeState>) -> SocketAddr {
    let router = Router::new()
        .route("/v1", get(ledger_info))
        .route("/v1/", get(ledger_info))
        .route("/v1/accounts/{address}", get(account))
        .route("/v1/accounts/{address}/resources", get(resources))
        .route("/v1/view", post(view))
        .route("/v1/transactions/encode_submission", post(encode_submission))
        .route("/v1/transactions", post(submit))
        .route("/v1/transactions/by_hash/{hash}", get(by_hash))
        .with_state(state);

    serve(router).await
}

/// Serve `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Chain config pointing at a mock node.
pub fn chain_config(node: SocketAddr) -> ChainConfig {
    ChainConfig {
        rpc_url: format!("http://{}/v1", node),
        network: "local".to_string(),
        vault_address: "0xcafe".to_string(),
        private_key: Some(TEST_PRIVATE_KEY.to_string()),
        rpc_timeout_secs: 2,
        transaction_timeout_secs: 1,
        poll_interval_ms: 20,
        ..ChainConfig::default()
    }
}
