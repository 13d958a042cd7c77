use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct VaultState {
    pub total_assets: u64,
    pub total_shares: u64,
    pub asset_token: String,
    pub is_initialized: bool,
    pub share_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub version: String,
    pub status: String,
    pub network: String,
    pub node_reachable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    pub network: String,
    pub vault_address: String,
    pub asset_token: String,
    pub rebalance_cooldown_secs: u64,
    pub gas_unit_price: u64,
    pub max_gas_amount: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Shares {
    pub address: String,
    pub shares: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub address: String,
    pub balance: u64, // octas
    pub formatted: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub status: String, // "connected" or "disconnected"
    pub session_id: Option<String>,
    pub address: Option<String>,
    pub public_key: Option<String>,
    pub connected_at: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    pub address: String,
    pub shares: u64,
    pub balance: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub timestamp: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub share_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Summary {
    pub samples: usize,
    pub first_share_price: Option<f64>,
    pub latest_share_price: Option<f64>,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Performance {
    pub samples: Vec<Sample>,
    pub summary: Summary,
}

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
    address: &'a str,
    public_key: Option<&'a str>,
}

/// Error returned when the API answers with a non-success status.
#[derive(Debug)]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dashboard API returned status {}: {}", self.status, self.body)
    }
}

impl std::error::Error for ApiError {}

pub struct DashboardClient {
    client: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<Health, Box<dyn std::error::Error>> {
        self.get("/api/health").await
    }

    pub async fn vault_config(&self) -> Result<VaultConfig, Box<dyn std::error::Error>> {
        self.get("/api/vault/config").await
    }

    /// Raw body of a GET request, for callers that need the exact JSON.
    pub async fn get_raw(&self, path: &str) -> Result<String, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(Box::new(ApiError {
                status: status.as_u16(),
                body: text,
            }));
        }
        Ok(text)
    }

    pub async fn vault_state(&self) -> Result<VaultState, Box<dyn std::error::Error>> {
        self.get("/api/vault/state").await
    }

    pub async fn is_initialized(&self) -> Result<bool, Box<dyn std::error::Error>> {
        let value: serde_json::Value = self.get("/api/vault/initialized").await?;
        Ok(value["initialized"].as_bool().unwrap_or(false))
    }

    pub async fn user_shares(&self, address: &str) -> Result<Shares, Box<dyn std::error::Error>> {
        self.get(&format!("/api/vault/shares/{}", address)).await
    }

    pub async fn account_balance(&self, address: &str) -> Result<Balance, Box<dyn std::error::Error>> {
        self.get(&format!("/api/accounts/{}/balance", address)).await
    }

    pub async fn performance(&self) -> Result<Performance, Box<dyn std::error::Error>> {
        self.get("/api/vault/performance").await
    }

    pub async fn session(&self) -> Result<Session, Box<dyn std::error::Error>> {
        self.get("/api/session").await
    }

    /// Record the wallet the dashboard should show.
    pub async fn connect(
        &self,
        address: &str,
        public_key: Option<&str>,
    ) -> Result<Session, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(format!("{}/api/session/connect", self.base_url))
            .json(&ConnectRequest { address, public_key })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn disconnect(&self) -> Result<bool, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(format!("{}/api/session/disconnect", self.base_url))
            .send()
            .await?;
        let value: serde_json::Value = decode(resp).await?;
        Ok(value["disconnected"].as_bool().unwrap_or(false))
    }

    pub async fn position(&self) -> Result<Position, Box<dyn std::error::Error>> {
        self.get("/api/session/position").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, Box<dyn std::error::Error>> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(Box::new(ApiError {
            status: status.as_u16(),
            body: text,
        }));
    }

    Ok(serde_json::from_str::<T>(&text)?)
}
