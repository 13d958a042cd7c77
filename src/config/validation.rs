//! Configuration validation.
//!
//! Serde handles syntax; this checks values. Every problem is reported, not
//! just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::chain::address::AccountAddress;
use crate::config::schema::DashboardConfig;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration.
pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }

    let chain = &config.chain;
    match chain.rpc_url.parse::<url::Url>() {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("chain.rpc_url", e.to_string())),
    }
    if let Err(e) = chain.vault_address.parse::<AccountAddress>() {
        errors.push(ValidationError::new("chain.vault_address", e.to_string()));
    }
    if chain.gas_unit_price == 0 {
        errors.push(ValidationError::new("chain.gas_unit_price", "must be > 0"));
    }
    if chain.max_gas_amount == 0 {
        errors.push(ValidationError::new("chain.max_gas_amount", "must be > 0"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.transaction_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.transaction_timeout_secs", "must be > 0"));
    }
    if chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("chain.poll_interval_ms", "must be > 0"));
    }
    if chain.asset_token.trim().is_empty() {
        errors.push(ValidationError::new("chain.asset_token", "must not be empty"));
    }

    if config.performance.enabled {
        if config.performance.sample_interval_secs == 0 {
            errors.push(ValidationError::new("performance.sample_interval_secs", "must be > 0"));
        }
        if config.performance.max_samples == 0 {
            errors.push(ValidationError::new("performance.max_samples", "must be > 0"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DashboardConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = DashboardConfig::default();
        config.server.bind_address = "nowhere".to_string();
        config.chain.rpc_url = "ws://node".to_string();
        config.chain.vault_address = "0xnothex".to_string();
        config.chain.gas_unit_price = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "server.bind_address",
                "chain.rpc_url",
                "chain.vault_address",
                "chain.gas_unit_price"
            ]
        );
    }

    #[test]
    fn test_disabled_sampler_is_not_checked() {
        let mut config = DashboardConfig::default();
        config.performance.enabled = false;
        config.performance.max_samples = 0;
        assert!(validate_config(&config).is_ok());
    }
}
