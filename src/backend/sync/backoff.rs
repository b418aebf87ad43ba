//! Backoff delays
//!
//! Write failures back off exponentially: the n-th consecutive failure waits
//! `base * 2^(n-1)` seconds, capped at `max`. Read failures wait a fixed
//! `transient` delay and leave the failure count alone.

use crate::shared::SyncConfig;
use chrono::{DateTime, Duration, Utc};

/// Delay parameters, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_secs: u64,
    pub max_secs: u64,
    pub transient_secs: u64,
}

impl BackoffPolicy {
    pub fn new(base_secs: u64, max_secs: u64, transient_secs: u64) -> Self {
        Self {
            base_secs,
            max_secs,
            transient_secs,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.base_delay_secs,
            config.max_delay_secs,
            config.transient_delay_secs,
        )
    }

    /// Delay for the given failure level (1 = first failure)
    pub fn delay_for(&self, level: u32) -> u64 {
        let factor = 2u64.checked_pow(level.saturating_sub(1)).unwrap_or(u64::MAX);
        self.base_secs.saturating_mul(factor).min(self.max_secs)
    }

    /// End of the window opened by a write failure at `level`
    pub fn until(&self, now: DateTime<Utc>, level: u32) -> DateTime<Utc> {
        shift(now, self.delay_for(level))
    }

    /// End of the window opened by a read failure
    pub fn transient_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        shift(now, self.transient_secs)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

fn shift(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
    now.checked_add_signed(Duration::seconds(secs))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
