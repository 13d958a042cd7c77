//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a missing file or section is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the dashboard backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dashboard API listener.
    pub server: ServerConfig,

    /// Network, vault and signer settings.
    pub chain: ChainConfig,

    /// Performance history sampling.
    pub performance: PerformanceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Dashboard API listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Origins allowed to call the API. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Chain client configuration. Immutable once a client is built from it.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// Full-node REST endpoint, including the `/v1` prefix.
    pub rpc_url: String,

    /// Network name (mainnet, testnet, devnet, local).
    pub network: String,

    /// Address the vault module is published at.
    pub vault_address: String,

    /// Signer private key (`ed25519-priv-0x...`). Never serialized.
    #[serde(skip_serializing)]
    pub private_key: Option<String>,

    /// Signer public key, checked against the private key when set.
    pub public_key: Option<String>,

    /// Symbol of the vault's asset token.
    pub asset_token: String,

    /// Minimum seconds between rebalances (enforced on-chain).
    pub rebalance_cooldown_secs: u64,

    /// Gas unit price in octas.
    pub gas_unit_price: u64,

    /// Maximum gas units per transaction.
    pub max_gas_amount: u64,

    /// Coin type whose store backs account balances.
    pub coin_type: String,

    /// Per-request node timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Seconds to wait for a submitted transaction to commit.
    pub transaction_timeout_secs: u64,

    /// Interval between finality lookups in milliseconds.
    pub poll_interval_ms: u64,

    /// Transaction expiration, in seconds from submission.
    pub expiration_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://fullnode.testnet.aptoslabs.com/v1".to_string(),
            network: "testnet".to_string(),
            vault_address: "0xcafe".to_string(),
            private_key: None,
            public_key: None,
            asset_token: "USDC".to_string(),
            rebalance_cooldown_secs: 3600,
            gas_unit_price: 100,
            max_gas_amount: 200_000,
            coin_type: "0x1::aptos_coin::AptosCoin".to_string(),
            rpc_timeout_secs: 10,
            transaction_timeout_secs: 30,
            poll_interval_ms: 500,
            expiration_secs: 60,
        }
    }
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("network", &self.network)
            .field("vault_address", &self.vault_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.public_key)
            .field("asset_token", &self.asset_token)
            .field("rebalance_cooldown_secs", &self.rebalance_cooldown_secs)
            .field("gas_unit_price", &self.gas_unit_price)
            .field("max_gas_amount", &self.max_gas_amount)
            .field("coin_type", &self.coin_type)
            .field("rpc_timeout_secs", &self.rpc_timeout_secs)
            .field("transaction_timeout_secs", &self.transaction_timeout_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

/// Performance history configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Enable background sampling.
    pub enabled: bool,

    /// Seconds between samples.
    pub sample_interval_secs: u64,

    /// Samples kept before the oldest is dropped.
    pub max_samples: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_interval_secs: 60,
            max_samples: 1440, // one day at the default interval
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.chain.network, "testnet");
        assert_eq!(config.chain.gas_unit_price, 100);
        assert_eq!(config.chain.max_gas_amount, 200_000);
        assert_eq!(config.chain.transaction_timeout_secs, 30);
        assert!(config.chain.private_key.is_none());
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_toml() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [chain]
            network = "mainnet"
            vault_address = "0xbeef"
            "#,
        )
        .unwrap();
        assert_eq!(config.chain.network, "mainnet");
        assert_eq!(config.chain.vault_address, "0xbeef");
        assert_eq!(config.chain.asset_token, "USDC");
        assert_eq!(config.performance.max_samples, 1440);
    }

    #[test]
    fn test_private_key_never_serialized_or_logged() {
        let mut config = ChainConfig::default();
        config.private_key = Some("ed25519-priv-0xsecret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));

        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
