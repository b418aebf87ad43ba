//! Property-based tests for backoff growth

use crate::common::*;
use chrono::Utc;
use proptest::prelude::*;
use tracksync::backend::clients::SinkError;
use tracksync::backend::store::MemoryStore;
use tracksync::backend::sync::BackoffPolicy;
use tracksync::shared::{SyncConfig, SyncState, TickOutcome};

proptest! {
    #[test]
    fn test_delay_monotonic_and_capped(base in 1u64..600, extra in 0u64..7200, level in 1u32..80) {
        let policy = BackoffPolicy::new(base, base + extra, 30);
        let delay = policy.delay_for(level);
        prop_assert!(delay <= base + extra);
        prop_assert!(delay >= base.min(base + extra));
        prop_assert!(policy.delay_for(level + 1) >= delay);
    }
}

/// Consecutive rate limits push the window further out until the cap
#[tokio::test]
async fn test_consecutive_rate_limits() {
    let failures = (0..8)
        .map(|_| Err(SinkError::RateLimited { retry_after: None }))
        .collect();
    let sink = RecordingSink::scripted("Smith", failures);
    let store = std::sync::Arc::new(MemoryStore::new());
    let service = sync_service(
        store.clone(),
        ScriptedSource::playing(anti_hero()),
        sink,
        SyncConfig::default(),
    );

    let mut now = Utc::now();
    let mut previous: Option<SyncState> = None;
    let mut offsets = Vec::new();
    for _ in 0..8 {
        let report = assert_ok!(service.tick(now).await);
        assert_eq!(report.outcome, TickOutcome::BackoffEntered);
        let until = report.state.backoff_until.unwrap();
        if let Some(prev) = &previous {
            assert!(until > prev.backoff_until.unwrap());
            assert_eq!(report.state.backoff_level, prev.backoff_level + 1);
        }
        offsets.push((until - now).num_seconds());
        previous = Some(report.state);
        now = until;
    }

    assert_eq!(offsets, vec![60, 120, 240, 480, 960, 1920, 3600, 3600]);
}
