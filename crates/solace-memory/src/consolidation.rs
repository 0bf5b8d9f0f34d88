//! Consolidation: promoting important short-term records into long-term
//! memory.
//!
//! A pass has two phases. First it drains the ingestion-time queue; then it
//! sweeps short-term memory for aged-but-important records whose queue entry
//! was lost (or that were ingested before the engine started). Promotion is
//! idempotent, so the two phases can safely overlap in what they cover.

use chrono::{DateTime, Duration, Utc};
use solace_config::MemoryConfig;
use tracing::debug;

use crate::record::Tier;
use crate::tiers::TierStore;

/// Outcome of a single consolidation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationReport {
    /// Records promoted from the ingestion queue.
    pub promoted: usize,
    /// Records promoted by the short-term sweep.
    pub swept: usize,
}

impl ConsolidationReport {
    pub fn total(&self) -> usize {
        self.promoted + self.swept
    }
}

/// Run one consolidation pass over the store.
pub fn run_pass(store: &TierStore, config: &MemoryConfig, now: DateTime<Utc>) -> ConsolidationReport {
    let threshold = config.long_term_threshold;
    let mut report = ConsolidationReport::default();

    // Phase 1: drain the queue. Importance is immutable, so the re-check is
    // always satisfied for queued ids; it states the promotion invariant.
    for id in store.drain_pending() {
        let Some(record) = store.get(&id, Tier::ShortTerm) else {
            // Already promoted by an earlier sweep, or never admitted.
            continue;
        };
        if record.importance >= threshold && store.promote(&id, now) {
            report.promoted += 1;
        }
    }

    // Phase 2: sweep short-term for aged important records.
    let sweep_floor = Duration::hours(config.sweep_age_hours as i64);
    let candidates = store.short_term_matching(|r| {
        r.importance >= threshold && r.age(now) > sweep_floor && !store.long_term_contains(&r.id)
    });
    for id in candidates {
        if store.promote(&id, now) {
            report.swept += 1;
        }
    }

    store.mark_consolidated(now);
    if report.total() > 0 {
        debug!(
            promoted = report.promoted,
            swept = report.swept,
            "consolidation pass complete"
        );
    }
    report
}
