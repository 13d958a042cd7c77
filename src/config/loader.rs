//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::DashboardConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables recognized as overrides.
pub const ENV_RPC_URL: &str = "VAULT_RPC_URL";
pub const ENV_NETWORK: &str = "VAULT_NETWORK";
pub const ENV_VAULT_ADDRESS: &str = "VAULT_ADDRESS";
pub const ENV_PRIVATE_KEY: &str = "VAULT_PRIVATE_KEY";
pub const ENV_PUBLIC_KEY: &str = "VAULT_PUBLIC_KEY";
pub const ENV_ASSET_TOKEN: &str = "VAULT_ASSET_TOKEN";
pub const ENV_REBALANCE_COOLDOWN: &str = "VAULT_REBALANCE_COOLDOWN_SECS";
pub const ENV_GAS_UNIT_PRICE: &str = "VAULT_GAS_UNIT_PRICE";
pub const ENV_MAX_GAS_AMOUNT: &str = "VAULT_MAX_GAS_AMOUNT";
pub const ENV_BIND_ADDRESS: &str = "VAULT_BIND_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "VAULT_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => DashboardConfig::default(),
    };

    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay values returned by `lookup` onto `config`. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut DashboardConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    let chain = &mut config.chain;
    if let Some(v) = get(ENV_RPC_URL) {
        chain.rpc_url = v;
    }
    if let Some(v) = get(ENV_NETWORK) {
        chain.network = v;
    }
    if let Some(v) = get(ENV_VAULT_ADDRESS) {
        chain.vault_address = v;
    }
    if let Some(v) = get(ENV_PRIVATE_KEY) {
        chain.private_key = Some(v);
    }
    if let Some(v) = get(ENV_PUBLIC_KEY) {
        chain.public_key = Some(v);
    }
    if let Some(v) = get(ENV_ASSET_TOKEN) {
        chain.asset_token = v;
    }
    if let Some(v) = get(ENV_REBALANCE_COOLDOWN) {
        chain.rebalance_cooldown_secs = parse_var(ENV_REBALANCE_COOLDOWN, v)?;
    }
    if let Some(v) = get(ENV_GAS_UNIT_PRICE) {
        chain.gas_unit_price = parse_var(ENV_GAS_UNIT_PRICE, v)?;
    }
    if let Some(v) = get(ENV_MAX_GAS_AMOUNT) {
        chain.max_gas_amount = parse_var(ENV_MAX_GAS_AMOUNT, v)?;
    }

    if let Some(v) = get(ENV_BIND_ADDRESS) {
        config.server.bind_address = v;
    }
    if let Some(v) = get(ENV_LOG_LEVEL) {
        config.observability.log_level = v;
    }
    Ok(())
}

fn parse_var<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: DashboardConfig = toml::from_str(
            r#"
            [chain]
            network = "devnet"
            gas_unit_price = 150
            "#,
        )
        .unwrap();

        apply_overrides(
            &mut config,
            lookup(&[
                (ENV_NETWORK, "mainnet"),
                (ENV_VAULT_ADDRESS, "0xbeef"),
                (ENV_MAX_GAS_AMOUNT, "50000"),
                (ENV_PRIVATE_KEY, "ed25519-priv-0xabc"),
            ]),
        )
        .unwrap();

        assert_eq!(config.chain.network, "mainnet");
        assert_eq!(config.chain.vault_address, "0xbeef");
        assert_eq!(config.chain.gas_unit_price, 150);
        assert_eq!(config.chain.max_gas_amount, 50_000);
        assert_eq!(config.chain.private_key.as_deref(), Some("ed25519-priv-0xabc"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let mut config = DashboardConfig::default();
        apply_overrides(&mut config, lookup(&[(ENV_PRIVATE_KEY, ""), (ENV_NETWORK, "  ")]))
            .unwrap();
        assert!(config.chain.private_key.is_none());
        assert_eq!(config.chain.network, "testnet");
    }

    #[test]
    fn test_bad_numeric_override() {
        let mut config = DashboardConfig::default();
        let err = apply_overrides(&mut config, lookup(&[(ENV_GAS_UNIT_PRICE, "cheap")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_GAS_UNIT_PRICE));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("vault_dashboard_loader_test.toml");
        fs::write(
            &path,
            r#"
            [server]
            bind_address = "127.0.0.1:3000"

            [chain]
            asset_token = "USDT"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.chain.asset_token, "USDT");

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
