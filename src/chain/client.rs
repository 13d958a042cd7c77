//! Vault chain client.
//!
//! # Responsibilities
//! - Hold the immutable chain configuration and signing identity
//! - Submit entry-function transactions and wait for finality
//! - Issue view calls against the vault module
//! - Report node reachability and network identity

use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chain::address::AccountAddress;
use crate::chain::identity::SigningIdentity;
use crate::chain::node::{LedgerInfo, NodeApi, RestNode, SubmitTransactionRequest, TransactionSignature, ViewRequest};
use crate::chain::transaction::{
    entry_payload, is_valid_identifier, resolve_entry_function, wait_for_finality, TxBuilder,
    VAULT_MODULE,
};
use crate::chain::types::{expected_chain_id, ChainConfig, ChainError, ChainResult, TransactionResult};
use crate::observability::metrics;

/// Client for the on-chain vault program.
///
/// Stateless across calls; share one instance behind an `Arc`.
pub struct VaultChainClient<N = RestNode> {
    node: N,
    config: ChainConfig,
    vault_address: AccountAddress,
    identity: Option<Arc<SigningIdentity>>,
    finality_timeout: Duration,
    poll_interval: Duration,
}

impl VaultChainClient<RestNode> {
    /// Create a client talking to `config.rpc_url`.
    pub fn new(config: ChainConfig) -> ChainResult<Self> {
        let node = RestNode::new(&config.rpc_url, Duration::from_secs(config.rpc_timeout_secs))
            .map_err(|e| ChainError::Configuration(e.to_string()))?;
        Self::with_node(config, node)
    }
}

impl<N: NodeApi> VaultChainClient<N> {
    /// Create a client over an arbitrary node implementation.
    pub fn with_node(config: ChainConfig, node: N) -> ChainResult<Self> {
        let vault_address: AccountAddress = config.vault_address.parse().map_err(|e| {
            ChainError::Configuration(format!(
                "Invalid vault address '{}': {}",
                config.vault_address, e
            ))
        })?;

        let private_key = non_empty(config.private_key.as_deref());
        let public_key = non_empty(config.public_key.as_deref());
        let identity = match (private_key, public_key) {
            (Some(sk), Some(pk)) => Some(SigningIdentity::from_key_pair(sk, pk)?),
            (Some(sk), None) => Some(SigningIdentity::from_private_key(sk)?),
            (None, Some(_)) => {
                tracing::warn!("Public key configured without a private key; client is read-only");
                None
            }
            (None, None) => None,
        };

        tracing::info!(
            rpc_url = %config.rpc_url,
            network = %config.network,
            vault_address = %vault_address,
            signer = ?identity.as_ref().map(|i| i.address()),
            "Vault chain client initialized"
        );

        Ok(Self {
            node,
            finality_timeout: Duration::from_secs(config.transaction_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            config,
            vault_address,
            identity: identity.map(Arc::new),
        })
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn vault_address(&self) -> AccountAddress {
        self.vault_address
    }

    /// Address of the signing identity, if one is configured.
    pub fn signer_address(&self) -> Option<AccountAddress> {
        self.identity.as_ref().map(|i| i.address())
    }

    /// The underlying node.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Fully qualified name of a vault view function.
    pub fn view_function_id(&self, function_name: &str) -> String {
        format!("{}::{}::{}", self.vault_address, VAULT_MODULE, function_name)
    }

    /// Sign and submit an entry-function call, then wait for it to commit.
    ///
    /// `entry_point` is either a bare vault function name or a fully
    /// qualified `address::module::function`.
    pub async fn submit_transaction(
        &self,
        entry_point: &str,
        args: Vec<Value>,
    ) -> ChainResult<TransactionResult> {
        let start = Instant::now();
        let result = self.submit_inner(entry_point, args).await;

        metrics::record_transaction(entry_point, result.is_ok(), start);
        match &result {
            Ok(tx) => tracing::info!(
                entry_point = %entry_point,
                tx_hash = %tx.hash,
                version = ?tx.version,
                gas_used = ?tx.gas_used,
                "Transaction committed"
            ),
            Err(e) => tracing::error!(entry_point = %entry_point, error = %e, "Transaction failed"),
        }
        result
    }

    async fn submit_inner(&self, entry_point: &str, args: Vec<Value>) -> ChainResult<TransactionResult> {
        let identity = self.identity.as_ref().ok_or_else(|| {
            ChainError::Transaction("No signing identity configured".to_string())
        })?;
        let function = resolve_entry_function(entry_point, &self.vault_address)
            .map_err(ChainError::Transaction)?;

        let sequence_number = self
            .node
            .sequence_number(&identity.address())
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to read sequence number: {}", e)))?;

        let builder = TxBuilder::new(
            identity.address(),
            self.config.max_gas_amount,
            self.config.gas_unit_price,
            self.config.expiration_secs,
        );
        let request = builder.build(sequence_number, entry_payload(function, args));

        let signing_message = self
            .node
            .encode_submission(&request)
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to encode transaction: {}", e)))?;

        let signed = SubmitTransactionRequest {
            transaction: request,
            signature: TransactionSignature {
                public_key: identity.public_key_hex(),
                signature: identity.sign(&signing_message),
            },
        };

        let pending = self
            .node
            .submit(&signed)
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to submit transaction: {}", e)))?;

        tracing::debug!(
            tx_hash = %pending.hash,
            sequence_number = sequence_number,
            "Transaction submitted"
        );

        wait_for_finality(&self.node, &pending.hash, self.finality_timeout, self.poll_interval).await
    }

    /// Call a read-only vault function.
    pub async fn call_view(
        &self,
        function_name: &str,
        args: Vec<Value>,
        type_args: Vec<String>,
    ) -> ChainResult<Vec<Value>> {
        if !is_valid_identifier(function_name) {
            return Err(ChainError::ViewCall(format!(
                "Invalid function name '{}'",
                function_name
            )));
        }

        let request = ViewRequest {
            function: self.view_function_id(function_name),
            type_arguments: type_args,
            arguments: args,
        };

        let start = Instant::now();
        let result = self.node.view(&request).await;
        metrics::record_view_call(function_name, result.is_ok(), start);

        result.map_err(|e| {
            tracing::warn!(function = %request.function, error = %e, "View call failed");
            ChainError::ViewCall(e.to_string())
        })
    }

    /// Current ledger summary.
    pub async fn ledger_info(&self) -> ChainResult<LedgerInfo> {
        self.node
            .ledger_info()
            .await
            .map_err(|e| ChainError::ViewCall(e.to_string()))
    }

    /// Check the node's chain ID against the configured network name.
    ///
    /// Networks without a well-known chain ID always pass.
    pub async fn verify_network(&self) -> ChainResult<()> {
        let Some(expected) = expected_chain_id(&self.config.network) else {
            return Ok(());
        };
        let ledger = self.ledger_info().await?;
        if ledger.chain_id != expected {
            return Err(ChainError::Configuration(format!(
                "Chain ID mismatch for network '{}': expected {}, got {}",
                self.config.network, expected, ledger.chain_id
            )));
        }
        Ok(())
    }

    /// Whether the node answers ledger queries.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.node.ledger_info().await.is_ok();
        metrics::record_node_health(healthy);
        healthy
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl<N> std::fmt::Debug for VaultChainClient<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("network", &self.config.network)
            .field("vault_address", &self.vault_address)
            .field("signer", &self.identity.as_ref().map(|i| i.address()))
            .finish()
    }
}
