//! Vault performance history for the dashboard chart.
//!
//! # Data Flow
//! ```text
//! tracker.rs (interval tick)
//!     → VaultChainClient::get_vault_state
//!     → history.rs (bounded ring of samples)
//!     → GET /api/vault/performance
//! ```

pub mod history;
pub mod tracker;

pub use history::{PerformanceHistory, PerformanceSample, PerformanceSummary};
pub use tracker::PerformanceTracker;
