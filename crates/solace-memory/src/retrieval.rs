//! Similarity-ranked retrieval across tiers.
//!
//! A query is embedded once, fanned out across the requested tiers, and the
//! merged candidate set is ranked by similarity band, then importance band,
//! then recency. Scores falling in the same 0.1-wide band are treated as
//! tied, so a slightly-less-similar but much-more-important record wins.

use std::time::Instant;

use chrono::{DateTime, Utc};
use solace_core::Result;
use tracing::debug;

use crate::embedding::{EmbeddingProvider, cosine_similarity};
use crate::record::{MemoryRecord, MemoryView, Tier};
use crate::tiers::TierStore;

/// Width of the similarity and importance bands used for ranking ties.
const BAND_WIDTH: f64 = 0.1;

/// Tiers searched when the caller does not name any.
const DEFAULT_TIERS: [Tier; 3] = [Tier::ShortTerm, Tier::LongTerm, Tier::Semantic];

/// Inclusive bounds on record timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if ts < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if ts > end {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct RetrieveOptions {
    /// Tiers to search; empty means the default set (short-term, long-term,
    /// semantic).
    pub tiers: Vec<Tier>,
    pub max_results: usize,
    pub similarity_threshold: f32,
    pub time_range: Option<TimeRange>,
    /// When false, context summaries are stripped from the results.
    pub include_context: bool,
    /// Deadline for the whole search; on expiry the tiers scanned so far
    /// are ranked and returned with `timed_out` set.
    pub timeout: Option<std::time::Duration>,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            tiers: Vec::new(),
            max_results: 10,
            similarity_threshold: 0.3,
            time_range: None,
            include_context: true,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub memories: Vec<MemoryView>,
    /// Candidates that passed the similarity and time filters, before
    /// truncation to `max_results`.
    pub total_found: usize,
    pub query_time_ms: u64,
    pub timed_out: bool,
}

/// Search the requested tiers for records similar to `query`.
///
/// Records without an embedding are skipped, not scored as zero. Long-term
/// hits that make the final result list get their access bookkeeping
/// updated as a side effect.
pub fn search(
    store: &TierStore,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    options: &RetrieveOptions,
) -> Result<RetrievalResult> {
    let started = Instant::now();
    let query_vec = embedder.embed(query)?;

    let tiers: &[Tier] = if options.tiers.is_empty() {
        &DEFAULT_TIERS
    } else {
        &options.tiers
    };

    let mut candidates: Vec<(MemoryRecord, Tier, f32)> = Vec::new();
    let mut timed_out = false;
    for &tier in tiers {
        if let Some(timeout) = options.timeout {
            if started.elapsed() >= timeout {
                timed_out = true;
                break;
            }
        }
        let hits = store.scan(tier, |record| {
            let embedding = record.embedding.as_ref()?;
            let similarity = cosine_similarity(&query_vec, embedding);
            if similarity < options.similarity_threshold {
                return None;
            }
            if let Some(ref range) = options.time_range {
                if !range.contains(record.timestamp) {
                    return None;
                }
            }
            Some(similarity)
        });
        candidates.extend(hits.into_iter().map(|(r, s)| (r, tier, s)));
    }

    let total_found = candidates.len();
    candidates.sort_by(|a, b| rank_key(b).cmp(&rank_key(a)));
    candidates.truncate(options.max_results);

    let long_term_hits: Vec<String> = candidates
        .iter()
        .filter(|(_, tier, _)| *tier == Tier::LongTerm)
        .map(|(r, _, _)| r.id.clone())
        .collect();
    if !long_term_hits.is_empty() {
        store.touch_long_term(&long_term_hits, Utc::now());
    }

    let memories: Vec<MemoryView> = candidates
        .iter()
        .map(|(record, tier, similarity)| {
            MemoryView::from_record(record, *tier, Some(*similarity), options.include_context)
        })
        .collect();

    let query_time_ms = started.elapsed().as_millis() as u64;
    debug!(
        total_found,
        returned = memories.len(),
        query_time_ms,
        timed_out,
        "retrieval complete"
    );
    Ok(RetrievalResult {
        memories,
        total_found,
        query_time_ms,
        timed_out,
    })
}

/// Banded ranking key: similarity band, then importance band, then recency.
/// Banding keeps the comparison a total order while treating scores within
/// 0.1 of the same band as tied.
fn rank_key(candidate: &(MemoryRecord, Tier, f32)) -> (i64, i64, DateTime<Utc>) {
    let (record, _, similarity) = candidate;
    (
        band(*similarity as f64),
        band(record.importance),
        record.timestamp,
    )
}

fn band(score: f64) -> i64 {
    (score / BAND_WIDTH).floor() as i64
}
