//! Bounded history of vault snapshots.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::chain::types::VaultState;

/// One sampled point on the performance chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSample {
    /// Unix seconds.
    pub timestamp: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub share_price: f64,
}

impl PerformanceSample {
    pub fn from_state(state: &VaultState, timestamp: u64) -> Self {
        Self {
            timestamp,
            total_assets: state.total_assets,
            total_shares: state.total_shares,
            share_price: state.share_price(),
        }
    }
}

/// Aggregate over the retained samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub samples: usize,
    pub first_share_price: Option<f64>,
    pub latest_share_price: Option<f64>,
    /// Share price change from first to latest sample, in percent.
    pub change_pct: Option<f64>,
}

/// Fixed-capacity sample buffer; the oldest sample is evicted first.
#[derive(Debug)]
pub struct PerformanceHistory {
    samples: Mutex<VecDeque<PerformanceSample>>,
    capacity: usize,
}

impl PerformanceHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, sample: PerformanceSample) {
        let mut samples = self.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    /// Samples oldest first.
    pub fn samples(&self) -> Vec<PerformanceSample> {
        self.lock().iter().cloned().collect()
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<PerformanceSample> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn summary(&self) -> PerformanceSummary {
        let samples = self.lock();
        let first = samples.front().map(|s| s.share_price);
        let latest = samples.back().map(|s| s.share_price);
        let change_pct = match (first, latest) {
            (Some(first), Some(latest)) if first > 0.0 => Some((latest - first) / first * 100.0),
            _ => None,
        };

        PerformanceSummary {
            samples: samples.len(),
            first_share_price: first,
            latest_share_price: latest,
            change_pct,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<PerformanceSample>> {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: u64, assets: u64, shares: u64) -> PerformanceSample {
        let state = VaultState {
            total_assets: assets,
            total_shares: shares,
            asset_token: "USDC".to_string(),
            is_initialized: true,
        };
        PerformanceSample::from_state(&state, timestamp)
    }

    #[test]
    fn test_evicts_oldest() {
        let history = PerformanceHistory::new(2);
        history.record(sample(1, 100, 100));
        history.record(sample(2, 110, 100));
        history.record(sample(3, 120, 100));

        let timestamps: Vec<_> = history.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![2, 3]);
        assert_eq!(history.latest().unwrap().timestamp, 3);
    }

    #[test]
    fn test_summary_change() {
        let history = PerformanceHistory::new(10);
        history.record(sample(1, 1000, 1000));
        history.record(sample(2, 1050, 1000));

        let summary = history.summary();
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.first_share_price, Some(1.0));
        assert_eq!(summary.latest_share_price, Some(1.05));
        assert!((summary.change_pct.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let history = PerformanceHistory::new(10);
        assert!(history.is_empty());
        let summary = history.summary();
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.change_pct, None);
    }
}
