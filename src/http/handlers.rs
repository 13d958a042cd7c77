//! Dashboard API handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::chain::address::AccountAddress;
use crate::chain::types::{format_octas, VaultState};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::performance::{PerformanceSample, PerformanceSummary};
use crate::session::SessionState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub network: String,
    pub node_reachable: bool,
}

/// Chain settings safe to show in the browser.
///
/// Leaves out key material and the node URL, which may embed an access token.
#[derive(Serialize)]
pub struct PublicConfig {
    pub network: String,
    pub vault_address: AccountAddress,
    pub asset_token: String,
    pub rebalance_cooldown_secs: u64,
    pub gas_unit_price: u64,
    pub max_gas_amount: u64,
}

#[derive(Serialize)]
pub struct VaultStateResponse {
    #[serde(flatten)]
    pub state: VaultState,
    pub share_price: f64,
}

#[derive(Serialize)]
pub struct InitializedResponse {
    pub initialized: bool,
}

#[derive(Serialize)]
pub struct SharesResponse {
    pub address: AccountAddress,
    pub shares: u64,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: AccountAddress,
    /// Octas.
    pub balance: u64,
    pub formatted: String,
}

#[derive(Serialize)]
pub struct PerformanceResponse {
    pub samples: Vec<PerformanceSample>,
    pub summary: PerformanceSummary,
}

#[derive(Deserialize)]
pub struct ConnectRequest {
    pub address: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub disconnected: bool,
}

#[derive(Serialize)]
pub struct PositionResponse {
    pub address: AccountAddress,
    pub shares: u64,
    pub balance: u64,
}

fn parse_address(raw: &str) -> Result<AccountAddress, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid address '{}': {}", raw, e)))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let node_reachable = state.client.is_healthy().await;
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if node_reachable { "ok" } else { "degraded" },
        network: state.client.config().network.clone(),
        node_reachable,
    })
}

pub async fn vault_config(State(state): State<AppState>) -> Json<PublicConfig> {
    let chain = state.client.config();
    Json(PublicConfig {
        network: chain.network.clone(),
        vault_address: state.client.vault_address(),
        asset_token: chain.asset_token.clone(),
        rebalance_cooldown_secs: chain.rebalance_cooldown_secs,
        gas_unit_price: chain.gas_unit_price,
        max_gas_amount: chain.max_gas_amount,
    })
}

pub async fn vault_state(
    State(state): State<AppState>,
) -> Result<Json<VaultStateResponse>, ApiError> {
    let vault = state.client.get_vault_state().await?;
    Ok(Json(VaultStateResponse {
        share_price: vault.share_price(),
        state: vault,
    }))
}

pub async fn vault_initialized(State(state): State<AppState>) -> Json<InitializedResponse> {
    Json(InitializedResponse {
        initialized: state.client.is_vault_initialized().await,
    })
}

pub async fn user_shares(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<SharesResponse>, ApiError> {
    let address = parse_address(&address)?;
    let shares = state.client.get_user_shares(&address).await;
    Ok(Json(SharesResponse { address, shares }))
}

pub async fn account_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let address = parse_address(&address)?;
    let balance = state.client.get_account_balance(&address).await;
    Ok(Json(BalanceResponse {
        address,
        balance,
        formatted: format_octas(balance),
    }))
}

pub async fn performance(State(state): State<AppState>) -> Json<PerformanceResponse> {
    Json(PerformanceResponse {
        samples: state.history.samples(),
        summary: state.history.summary(),
    })
}

pub async fn session_state(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.session.snapshot())
}

pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<SessionState>, ApiError> {
    let address = parse_address(&request.address)?;
    let public_key = match request.public_key {
        Some(key) => Some(normalize_public_key(&key)?),
        None => None,
    };
    Ok(Json(state.session.connect(address, public_key)))
}

pub async fn disconnect(State(state): State<AppState>) -> Json<DisconnectResponse> {
    Json(DisconnectResponse {
        disconnected: state.session.disconnect(),
    })
}

/// Shares and wallet balance of the connected account.
pub async fn position(
    State(state): State<AppState>,
) -> Result<Json<PositionResponse>, ApiError> {
    let address = state
        .session
        .snapshot()
        .address()
        .ok_or_else(|| ApiError::Conflict("No wallet connected".to_string()))?;

    let (shares, balance) = tokio::join!(
        state.client.get_user_shares(&address),
        state.client.get_account_balance(&address),
    );
    Ok(Json(PositionResponse {
        address,
        shares,
        balance,
    }))
}

/// Ed25519 public keys are 32 bytes of hex.
fn normalize_public_key(raw: &str) -> Result<String, ApiError> {
    let digits = raw.trim().trim_start_matches("0x");
    match hex::decode(digits) {
        Ok(bytes) if bytes.len() == 32 => Ok(format!("0x{}", hex::encode(bytes))),
        _ => Err(ApiError::BadRequest(format!("Invalid public key '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_public_key() {
        let key = format!("0x{}", "AB".repeat(32));
        assert_eq!(normalize_public_key(&key).unwrap(), format!("0x{}", "ab".repeat(32)));
        assert!(normalize_public_key("0x1234").is_err());
        assert!(normalize_public_key("zz").is_err());
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0x1").is_ok());
        assert!(matches!(parse_address("nope"), Err(ApiError::BadRequest(_))));
    }
}
