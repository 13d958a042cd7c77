//! Process-wide wallet session.
//!
//! The single holder of wallet connection state. The browser wallet performs
//! the actual connection; this records which account the dashboard is showing
//! and lets presentation code read or subscribe to it.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use uuid::Uuid;

use crate::chain::address::AccountAddress;

/// Wallet connection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connected {
        session_id: Uuid,
        address: AccountAddress,
        public_key: Option<String>,
        /// Unix seconds.
        connected_at: u64,
    },
}

impl SessionState {
    pub fn address(&self) -> Option<AccountAddress> {
        match self {
            SessionState::Connected { address, .. } => Some(*address),
            SessionState::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected { .. })
    }
}

/// Holder of the current [`SessionState`].
#[derive(Debug)]
pub struct WalletSession {
    tx: watch::Sender<SessionState>,
}

impl WalletSession {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::Disconnected);
        Self { tx }
    }

    /// Record a connection, replacing any previous one.
    pub fn connect(&self, address: AccountAddress, public_key: Option<String>) -> SessionState {
        let state = SessionState::Connected {
            session_id: Uuid::new_v4(),
            address,
            public_key,
            connected_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        let previous = self.tx.send_replace(state.clone());
        if let Some(prev) = previous.address() {
            if prev != address {
                tracing::info!(previous = %prev, address = %address, "Wallet session switched account");
            }
        }
        tracing::info!(address = %address, "Wallet connected");
        state
    }

    /// Clear the connection. Returns whether one existed.
    pub fn disconnect(&self) -> bool {
        let previous = self.tx.send_replace(SessionState::Disconnected);
        match previous.address() {
            Some(address) => {
                tracing::info!(address = %address, "Wallet disconnected");
                true
            }
            None => false,
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}
