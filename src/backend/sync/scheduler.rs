//! # Sync Scheduler
//!
//! In-process interval trigger for deployments without an external cron.
//! Ticks run one after another on the same task: a slow tick delays the next
//! one and missed ticks are skipped rather than bursted.

use crate::backend::sync::SyncService;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval tick loop
#[derive(Debug, Clone, Copy)]
pub struct SyncScheduler {
    interval: Duration,
}

impl SyncScheduler {
    /// `None` when the interval is zero, i.e. ticks come from outside
    pub fn new(interval: Duration) -> Option<Self> {
        (!interval.is_zero()).then_some(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run ticks forever
    pub async fn run(self, service: Arc<SyncService>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!("Scheduler running every {}s", self.interval.as_secs());

        loop {
            ticker.tick().await;
            if let Err(e) = service.tick(Utc::now()).await {
                tracing::error!("Scheduled tick failed: {}", e);
            }
        }
    }

    pub fn spawn(self, service: Arc<SyncService>) -> JoinHandle<()> {
        tokio::spawn(self.run(service))
    }
}
