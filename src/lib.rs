//! Yield Vault Dashboard Backend Library

pub mod chain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod performance;
pub mod session;

pub use chain::VaultChainClient;
pub use config::schema::DashboardConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
