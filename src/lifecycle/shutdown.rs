//! Shutdown coordination between the API server and background tasks.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Cloneable; any clone can trigger, every listener observes it once.
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A listener that resolves once shutdown is triggered.
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    #[cfg(test)]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Awaitable side of [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Wait until shutdown is triggered (returns immediately if it already was).
    pub async fn wait(&mut self) {
        // An error means the coordinator was dropped, which also ends the task.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
