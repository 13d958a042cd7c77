//! Vault chain client subsystem.
//!
//! # Data Flow
//! ```text
//! ChainConfig (env / config file)
//!     → identity.rs (key parsing, address derivation, signing)
//!     → client.rs (view calls, submit + finality wait)
//!         → transaction.rs (entry resolution, request building, polling)
//!         → node.rs (full-node REST API with timeouts)
//!     → vault.rs (named queries and operations)
//! ```
//!
//! # Security Constraints
//! - Key material is never logged or serialized
//! - Every node call is bounded by a timeout
//! - Transactions are never retried automatically

pub mod address;
pub mod client;
pub mod identity;
pub mod node;
pub mod transaction;
pub mod types;
pub mod vault;

pub use address::AccountAddress;
pub use client::VaultChainClient;
pub use identity::SigningIdentity;
pub use node::{NodeApi, NodeError, RestNode};
pub use types::{ChainConfig, ChainError, ChainResult, TransactionResult, VaultState};
