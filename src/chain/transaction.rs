//! Transaction building and finality monitoring.
//!
//! # Responsibilities
//! - Resolve entry-point names against the vault module
//! - Build unsigned requests with the configured gas parameters
//! - Poll a submitted hash until it is committed or the deadline passes

use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::chain::address::AccountAddress;
use crate::chain::node::{
    CommittedTransaction, EntryFunctionPayload, NodeApi, TransactionStatus, UserTransactionRequest,
};
use crate::chain::types::{ChainError, ChainResult, TransactionResult};

/// Module holding the vault's entry and view functions.
pub const VAULT_MODULE: &str = "vault";

/// Builds unsigned transactions for one sender.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    sender: AccountAddress,
    max_gas_amount: u64,
    gas_unit_price: u64,
    expiration_secs: u64,
}

impl TxBuilder {
    pub fn new(
        sender: AccountAddress,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_secs: u64,
    ) -> Self {
        Self {
            sender,
            max_gas_amount,
            gas_unit_price,
            expiration_secs,
        }
    }

    /// Build a request expiring `expiration_secs` from now.
    pub fn build(&self, sequence_number: u64, payload: EntryFunctionPayload) -> UserTransactionRequest {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.build_at(sequence_number, payload, now)
    }

    /// Build a request relative to the given unix time.
    pub fn build_at(
        &self,
        sequence_number: u64,
        payload: EntryFunctionPayload,
        now_secs: u64,
    ) -> UserTransactionRequest {
        UserTransactionRequest {
            sender: self.sender,
            sequence_number: sequence_number.to_string(),
            max_gas_amount: self.max_gas_amount.to_string(),
            gas_unit_price: self.gas_unit_price.to_string(),
            expiration_timestamp_secs: now_secs.saturating_add(self.expiration_secs).to_string(),
            payload,
        }
    }
}

/// Whether `name` is a valid Move identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolve an entry point to a fully qualified `address::module::function`.
///
/// Bare names resolve against the vault module at `vault_address`.
pub fn resolve_entry_function(entry_point: &str, vault_address: &AccountAddress) -> Result<String, String> {
    let parts: Vec<&str> = entry_point.split("::").collect();
    match parts.as_slice() {
        [name] if is_valid_identifier(name) => {
            Ok(format!("{}::{}::{}", vault_address, VAULT_MODULE, name))
        }
        [address, module, name] if is_valid_identifier(module) && is_valid_identifier(name) => {
            let address: AccountAddress = address
                .parse()
                .map_err(|e| format!("invalid module address '{}': {}", address, e))?;
            Ok(format!("{}::{}::{}", address, module, name))
        }
        _ => Err(format!("invalid entry function '{}'", entry_point)),
    }
}

/// Entry-function payload with no type arguments.
pub fn entry_payload(function: String, arguments: Vec<Value>) -> EntryFunctionPayload {
    EntryFunctionPayload {
        function,
        type_arguments: Vec::new(),
        arguments,
    }
}

/// Wait until `hash` is committed.
///
/// Fails with [`ChainError::Transaction`] when the deadline passes, when the
/// node reports the transaction as failed, or when a lookup errors.
pub async fn wait_for_finality<N: NodeApi>(
    node: &N,
    hash: &str,
    timeout_duration: Duration,
    poll_interval: Duration,
) -> ChainResult<TransactionResult> {
    let poll_interval = poll_interval.max(Duration::from_millis(1));

    let result = timeout(timeout_duration, async {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let status = node
                .transaction_by_hash(hash)
                .await
                .map_err(|e| ChainError::Transaction(e.to_string()))?;

            match status {
                TransactionStatus::Pending => {
                    tracing::debug!(tx_hash = %hash, "Transaction pending");
                }
                TransactionStatus::Committed(tx) => return Ok(tx),
            }
        }
    })
    .await;

    let committed = match result {
        Ok(committed) => committed?,
        Err(_) => {
            return Err(ChainError::Transaction(format!(
                "Transaction {} not finalized within {} seconds",
                hash,
                timeout_duration.as_secs_f64()
            )))
        }
    };

    let outcome = to_result(committed);
    if !outcome.success {
        return Err(ChainError::Transaction(format!(
            "Transaction {} failed on-chain: {}",
            outcome.hash, outcome.vm_status
        )));
    }
    Ok(outcome)
}

fn to_result(tx: CommittedTransaction) -> TransactionResult {
    TransactionResult {
        success: tx.success,
        hash: tx.hash,
        version: tx.version.and_then(|v| v.parse().ok()),
        gas_used: tx.gas_used.and_then(|g| g.parse().ok()),
        vm_status: tx.vm_status,
        events: tx.events,
    }
}
