//! Active Expiry
//!
//! Lazy expiry only removes a key when something touches it. A key that
//! expires and is never read again would stay resident, so a background
//! tokio task walks the shards on a timer and drops whatever has expired.
//!
//! The pass interval adapts to the workload:
//!
//! - more than `speedup_threshold` of the scanned keys expired: halve it,
//!   down to `min_interval`
//! - nothing expired: double it, up to `max_interval`
//!
//! The sweeper only ever removes entries that reads already treat as absent,
//! so it never changes what a client observes.

use crate::storage::StorageEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Sweeper tuning.
#[derive(Debug, Clone)]
pub struct ExpiryConfig {
    /// Interval before the first pass (default: 100ms)
    pub base_interval: Duration,

    /// Floor for the adaptive interval (default: 10ms)
    pub min_interval: Duration,

    /// Ceiling for the adaptive interval (default: 1s)
    pub max_interval: Duration,

    /// Fraction of scanned keys that must expire in one pass to speed up
    pub speedup_threshold: f64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(100),
            min_interval: Duration::from_millis(10),
            max_interval: Duration::from_secs(1),
            speedup_threshold: 0.25,
        }
    }
}

impl ExpiryConfig {
    /// Defaults, with the first pass after `base_interval`.
    ///
    /// The bounds widen to keep `base_interval` inside them.
    pub fn with_base_interval(base_interval: Duration) -> Self {
        let defaults = Self::default();
        Self {
            base_interval,
            min_interval: defaults.min_interval.min(base_interval),
            max_interval: defaults.max_interval.max(base_interval),
            ..defaults
        }
    }

    /// The interval to wait after a pass that scanned `scanned` keys and
    /// removed `expired` of them.
    pub fn next_interval(&self, current: Duration, scanned: u64, expired: u64) -> Duration {
        if expired == 0 {
            return (current * 2).min(self.max_interval);
        }
        let rate = expired as f64 / scanned.max(1) as f64;
        if rate > self.speedup_threshold {
            (current / 2).max(self.min_interval)
        } else {
            current
        }
    }
}

/// Handle to the running sweeper task. Dropping it stops the task.
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Spawns the sweeper on the current tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use quartzkv::storage::{ExpiryConfig, ExpirySweeper, StorageEngine};
    /// use std::sync::Arc;
    ///
    /// let engine = Arc::new(StorageEngine::new());
    /// let sweeper = ExpirySweeper::start(engine, ExpiryConfig::default());
    ///
    /// // Dropping the handle stops the task
    /// drop(sweeper);
    /// ```
    pub fn start(engine: Arc<StorageEngine>, config: ExpiryConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            interval_ms = config.base_interval.as_millis() as u64,
            "Background expiry sweeper started"
        );
        tokio::spawn(sweeper_loop(engine, config, shutdown_rx));

        Self { shutdown_tx }
    }

    /// Signals the task to exit. Also runs on drop.
    pub fn stop(&self) {
        if self.shutdown_tx.send(true).is_ok() {
            info!("Background expiry sweeper stopped");
        }
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweeper_loop(
    engine: Arc<StorageEngine>,
    config: ExpiryConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = config.base_interval;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let report = engine.cleanup_expired();
        let next = config.next_interval(interval, report.scanned, report.removed);

        if report.removed > 0 {
            debug!(
                expired = report.removed,
                keys_remaining = report.scanned - report.removed,
                next_interval_ms = next.as_millis() as u64,
                "Expired keys cleaned up"
            );
        } else if next != interval {
            trace!(next_interval_ms = next.as_millis() as u64, "Idle pass, backing off");
        }
        interval = next;
    }
}
