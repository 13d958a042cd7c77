//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Errors surfaced by the vault chain client.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Bad key material, address or endpoint at construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Signing, submission or finality failure.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Read-only call failure.
    #[error("View call error: {0}")]
    ViewCall(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Outcome of a committed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    pub hash: String,
    /// Ledger version the transaction was committed at.
    pub version: Option<u64>,
    pub gas_used: Option<u64>,
    pub vm_status: String,
    /// Events emitted by the transaction, as reported by the node.
    #[serde(default)]
    pub events: Vec<Value>,
}

/// Read projection of the vault, rebuilt on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    pub total_assets: u64,
    pub total_shares: u64,
    pub asset_token: String,
    pub is_initialized: bool,
}

impl VaultState {
    /// Assets backing one share. An empty vault prices shares at 1.0.
    pub fn share_price(&self) -> f64 {
        if self.total_shares == 0 {
            return 1.0;
        }
        self.total_assets as f64 / self.total_shares as f64
    }
}

/// Well-known chain IDs by network name.
pub fn expected_chain_id(network: &str) -> Option<u8> {
    match network.to_ascii_lowercase().as_str() {
        "mainnet" => Some(1),
        "testnet" => Some(2),
        "local" | "localnet" => Some(4),
        _ => None,
    }
}

/// Format an octa amount as whole tokens with eight decimals.
pub fn format_octas(octas: u64) -> String {
    format!("{}.{:08}", octas / 100_000_000, octas % 100_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainError::ViewCall("function not found".to_string());
        assert_eq!(err.to_string(), "View call error: function not found");

        let err = ChainError::Transaction("timed out".to_string());
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_share_price() {
        let mut state = VaultState {
            total_assets: 1500,
            total_shares: 1000,
            asset_token: "USDC".to_string(),
            is_initialized: true,
        };
        assert!((state.share_price() - 1.5).abs() < f64::EPSILON);

        state.total_shares = 0;
        assert!((state.share_price() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expected_chain_id() {
        assert_eq!(expected_chain_id("mainnet"), Some(1));
        assert_eq!(expected_chain_id("Testnet"), Some(2));
        assert_eq!(expected_chain_id("devnet"), None);
    }

    #[test]
    fn test_format_octas() {
        assert_eq!(format_octas(0), "0.00000000");
        assert_eq!(format_octas(150_000_000), "1.50000000");
        assert_eq!(format_octas(1), "0.00000001");
    }
}
