//! Client for the vault dashboard API.

pub mod client;

pub use client::{ApiError, DashboardClient};
