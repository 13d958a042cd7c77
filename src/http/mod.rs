//! Dashboard HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! Browser dashboard
//!     → server.rs (request ID, trace span, timeout, CORS, metrics)
//!     → handlers.rs (chain client / session / performance history)
//!     → error.rs (ApiError → JSON error body + status)
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, AppState, HttpServer, X_REQUEST_ID};
