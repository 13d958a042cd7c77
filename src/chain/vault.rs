//! Named vault queries and operations.
//!
//! Single-value queries degrade to a neutral default when the node call
//! fails; [`VaultChainClient::get_vault_state`] propagates instead, so a
//! composite read never reports a half-known vault.

use serde_json::{json, Value};

use crate::chain::address::AccountAddress;
use crate::chain::client::VaultChainClient;
use crate::chain::node::NodeApi;
use crate::chain::types::{ChainError, ChainResult, TransactionResult, VaultState};

/// Coin store resource type for `coin_type`.
pub fn coin_store_type(coin_type: &str) -> String {
    format!("0x1::coin::CoinStore<{}>", coin_type)
}

impl<N: NodeApi> VaultChainClient<N> {
    /// Whether the vault has been initialized. `false` if the call fails.
    pub async fn is_vault_initialized(&self) -> bool {
        match self.call_view("is_initialized", vec![], vec![]).await {
            Ok(values) => first(&values, "is_initialized")
                .and_then(|v| as_bool(v, "is_initialized"))
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Unexpected is_initialized result");
                    false
                }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read vault initialization");
                false
            }
        }
    }

    /// Read total assets, total shares, asset token and initialization.
    ///
    /// The four reads run concurrently and are not a consistent snapshot.
    pub async fn get_vault_state(&self) -> ChainResult<VaultState> {
        let (assets, shares, token, initialized) = tokio::try_join!(
            self.call_view("total_assets", vec![], vec![]),
            self.call_view("total_shares", vec![], vec![]),
            self.call_view("get_asset_token", vec![], vec![]),
            self.call_view("is_initialized", vec![], vec![]),
        )?;

        Ok(VaultState {
            total_assets: as_u64(first(&assets, "total_assets")?, "total_assets")?,
            total_shares: as_u64(first(&shares, "total_shares")?, "total_shares")?,
            asset_token: as_token(first(&token, "get_asset_token")?, "get_asset_token")?,
            is_initialized: as_bool(first(&initialized, "is_initialized")?, "is_initialized")?,
        })
    }

    /// Vault shares held by `user`. `0` if the call fails.
    pub async fn get_user_shares(&self, user: &AccountAddress) -> u64 {
        let args = vec![json!(user.to_string())];
        match self.call_view("get_user_shares", args, vec![]).await {
            Ok(values) => first(&values, "get_user_shares")
                .and_then(|v| as_u64(v, "get_user_shares"))
                .unwrap_or_else(|e| {
                    tracing::warn!(user = %user, error = %e, "Unexpected get_user_shares result");
                    0
                }),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Failed to read user shares");
                0
            }
        }
    }

    /// Native coin balance of `address` in octas.
    ///
    /// `0` if the lookup fails or the account holds no coin store.
    pub async fn get_account_balance(&self, address: &AccountAddress) -> u64 {
        let resources = match self.node().account_resources(address).await {
            Ok(resources) => resources,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Failed to read account resources");
                return 0;
            }
        };

        let store_type = coin_store_type(&self.config().coin_type);
        let Some(store) = resources.iter().find(|r| r.resource_type == store_type) else {
            tracing::debug!(address = %address, "No coin store resource");
            return 0;
        };

        as_u64(&store.data["coin"]["value"], "coin.value").unwrap_or_else(|e| {
            tracing::warn!(address = %address, error = %e, "Unexpected coin store shape");
            0
        })
    }

    /// Initialize the vault.
    pub async fn initialize_vault(&self) -> ChainResult<TransactionResult> {
        self.submit_transaction("initialize", vec![]).await
    }

    /// Deposit `amount` of the asset token.
    pub async fn deposit(&self, amount: u64) -> ChainResult<TransactionResult> {
        self.submit_transaction("deposit", vec![json!(amount.to_string())])
            .await
    }

    /// Redeem `shares` for the underlying asset.
    pub async fn withdraw(&self, shares: u64) -> ChainResult<TransactionResult> {
        self.submit_transaction("withdraw", vec![json!(shares.to_string())])
            .await
    }

    /// Trigger a rebalance. The cooldown is enforced on-chain.
    pub async fn rebalance(&self) -> ChainResult<TransactionResult> {
        self.submit_transaction("rebalance", vec![]).await
    }
}

fn shape_error(function: &str, expected: &str, value: &Value) -> ChainError {
    ChainError::ViewCall(format!(
        "{} returned {} where {} was expected",
        function, value, expected
    ))
}

fn first<'a>(values: &'a [Value], function: &str) -> ChainResult<&'a Value> {
    values
        .first()
        .ok_or_else(|| ChainError::ViewCall(format!("{} returned no values", function)))
}

/// Move u64 values arrive as decimal strings; plain numbers are accepted too.
fn as_u64(value: &Value, function: &str) -> ChainResult<u64> {
    match value {
        Value::String(s) => s.parse().map_err(|_| shape_error(function, "u64", value)),
        Value::Number(n) => n.as_u64().ok_or_else(|| shape_error(function, "u64", value)),
        _ => Err(shape_error(function, "u64", value)),
    }
}

fn as_bool(value: &Value, function: &str) -> ChainResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| shape_error(function, "bool", value))
}

/// The asset token is a string, or an object reference `{ "inner": "0x..." }`.
fn as_token(value: &Value, function: &str) -> ChainResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => map
            .get("inner")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| shape_error(function, "string", value)),
        _ => Err(shape_error(function, "string", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::client::tests::{client, MockNode};
    use crate::chain::node::AccountResource;

    fn user() -> AccountAddress {
        "0xa11ce".parse().unwrap()
    }

    #[tokio::test]
    async fn test_vault_state_round_trip() {
        let client = client(MockNode::vault(1000, 1000, "USDC", true));
        let state = client.get_vault_state().await.unwrap();
        assert_eq!(
            state,
            VaultState {
                total_assets: 1000,
                total_shares: 1000,
                asset_token: "USDC".to_string(),
                is_initialized: true,
            }
        );
    }

    #[tokio::test]
    async fn test_vault_state_propagates_failure() {
        let client = client(MockNode::offline());
        let result = client.get_vault_state().await;
        assert!(matches!(result, Err(ChainError::ViewCall(_))));
    }

    #[tokio::test]
    async fn test_vault_state_rejects_bad_shape() {
        let mut node = MockNode::vault(1000, 1000, "USDC", true);
        node.views
            .insert("total_assets".to_string(), vec![json!("not-a-number")]);
        let client = client(node);
        assert!(matches!(
            client.get_vault_state().await,
            Err(ChainError::ViewCall(_))
        ));
    }

    #[tokio::test]
    async fn test_asset_token_object_form() {
        let mut node = MockNode::vault(1, 1, "USDC", true);
        node.views.insert(
            "get_asset_token".to_string(),
            vec![json!({ "inner": "0xbeef" })],
        );
        let state = client(node).get_vault_state().await.unwrap();
        assert_eq!(state.asset_token, "0xbeef");
    }

    #[tokio::test]
    async fn test_single_queries_default_on_failure() {
        let client = client(MockNode::offline());
        assert!(!client.is_vault_initialized().await);
        assert_eq!(client.get_user_shares(&user()).await, 0);
        assert_eq!(client.get_account_balance(&user()).await, 0);
    }

    #[tokio::test]
    async fn test_user_shares() {
        let mut node = MockNode::vault(1000, 1000, "USDC", true);
        node.views
            .insert("get_user_shares".to_string(), vec![json!("250")]);
        let client = client(node);
        assert_eq!(client.get_user_shares(&user()).await, 250);
        assert!(client.is_vault_initialized().await);
    }

    #[tokio::test]
    async fn test_account_balance_from_coin_store() {
        let mut node = MockNode::vault(0, 0, "USDC", true);
        node.resources = vec![
            AccountResource {
                resource_type: "0x1::account::Account".to_string(),
                data: json!({ "sequence_number": "3" }),
            },
            AccountResource {
                resource_type: coin_store_type("0x1::aptos_coin::AptosCoin"),
                data: json!({ "coin": { "value": "123456789" }, "frozen": false }),
            },
        ];
        let client = client(node);
        assert_eq!(client.get_account_balance(&user()).await, 123_456_789);
    }

    #[tokio::test]
    async fn test_account_balance_without_coin_store() {
        let mut node = MockNode::vault(0, 0, "USDC", true);
        node.resources = vec![AccountResource {
            resource_type: "0x1::account::Account".to_string(),
            data: json!({}),
        }];
        assert_eq!(client(node).get_account_balance(&user()).await, 0);
    }

    #[tokio::test]
    async fn test_entry_operations_encode_amounts() {
        let client = client(MockNode::vault(0, 0, "USDC", true));
        client.deposit(1_000_000).await.unwrap();

        let submitted = client.node().submitted.lock().unwrap();
        let payload = &submitted[0].transaction.payload;
        assert!(payload.function.ends_with("::vault::deposit"));
        assert_eq!(payload.arguments, vec![json!("1000000")]);
    }
}
