//! Eviction: trimming every tier back to its capacity and age policy.
//!
//! Short-term eviction only removes records whose importance is below the
//! consolidation threshold — old-but-important records are left for the
//! consolidation sweep, so a record is never lost before it had its chance
//! to be promoted.

use chrono::{DateTime, Duration, Utc};
use solace_config::MemoryConfig;
use tracing::debug;

use crate::tiers::TierStore;

/// Outcome of a single eviction pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvictionReport {
    pub short_term_evicted: usize,
    pub episodic_truncated: usize,
    pub working_trimmed: usize,
}

impl EvictionReport {
    pub fn total(&self) -> usize {
        self.short_term_evicted + self.episodic_truncated + self.working_trimmed
    }
}

/// Run one eviction pass over the store.
pub fn run_pass(store: &TierStore, config: &MemoryConfig, now: DateTime<Utc>) -> EvictionReport {
    let retention = Duration::hours(config.short_term_retention_hours as i64);
    let threshold = config.long_term_threshold;

    let stale = store
        .short_term_matching(|r| r.age(now) > retention && r.importance < threshold);
    let short_term_evicted = store.evict_short_term(&stale);

    let episodic_truncated = store.truncate_episodic(config.max_episodes);
    let working_trimmed =
        store.trim_working(config.max_working_items, config.working_half_life_secs, now);

    let report = EvictionReport {
        short_term_evicted,
        episodic_truncated,
        working_trimmed,
    };
    if report.total() > 0 {
        debug!(
            short_term = report.short_term_evicted,
            episodic = report.episodic_truncated,
            working = report.working_trimmed,
            "eviction pass complete"
        );
    }
    report
}
