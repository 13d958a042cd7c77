//! Background vault sampler.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, MissedTickBehavior};

use crate::chain::client::VaultChainClient;
use crate::chain::node::NodeApi;
use crate::chain::types::ChainResult;
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::performance::history::{PerformanceHistory, PerformanceSample};

/// Periodically records vault state into a [`PerformanceHistory`].
pub struct PerformanceTracker<N> {
    client: Arc<VaultChainClient<N>>,
    history: Arc<PerformanceHistory>,
    sample_interval: Duration,
}

impl<N: NodeApi> PerformanceTracker<N> {
    pub fn new(
        client: Arc<VaultChainClient<N>>,
        history: Arc<PerformanceHistory>,
        sample_interval: Duration,
    ) -> Self {
        Self {
            client,
            history,
            sample_interval,
        }
    }

    /// Sample until shutdown. Failed samples are logged and skipped.
    pub async fn run(self, mut shutdown: ShutdownListener) {
        tracing::info!(
            interval_secs = self.sample_interval.as_secs(),
            "Starting performance tracker"
        );

        let mut ticker = interval(self.sample_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.wait() => break,
            }

            // A sample in flight must not hold up shutdown.
            tokio::select! {
                result = self.sample_once() => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "Skipping performance sample");
                    }
                }
                _ = shutdown.wait() => break,
            }
        }
        tracing::info!("Performance tracker stopped");
    }

    /// Read the vault state once and record it.
    pub async fn sample_once(&self) -> ChainResult<PerformanceSample> {
        let state = self.client.get_vault_state().await?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let sample = PerformanceSample::from_state(&state, timestamp);
        metrics::record_share_price(sample.share_price);
        tracing::debug!(
            total_assets = sample.total_assets,
            total_shares = sample.total_shares,
            share_price = sample.share_price,
            "Recorded performance sample"
        );

        self.history.record(sample.clone());
        Ok(sample)
    }
}
