//! The five tier collections and all locking.
//!
//! Every collection is guarded by its own `parking_lot::RwLock`; mutating
//! operations take the write lock of the tier(s) they touch, reads take the
//! shared lock. Cross-tier promotion acquires ShortTerm before LongTerm —
//! always in that order, so a future reverse-direction operation cannot
//! deadlock against it.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::importance;
use crate::record::{ConsolidatedRecord, MemoryRecord, StoreStatus, Tier, WorkingRecord};

/// Owns the five collections and the consolidation queue.
pub struct TierStore {
    short_term: RwLock<HashMap<String, MemoryRecord>>,
    long_term: RwLock<HashMap<String, ConsolidatedRecord>>,
    episodic: RwLock<VecDeque<MemoryRecord>>,
    semantic: RwLock<HashMap<String, MemoryRecord>>,
    working: RwLock<HashMap<String, WorkingRecord>>,
    /// Ids awaiting consolidation, in arrival order.
    pending: Mutex<VecDeque<String>>,
    last_consolidation: RwLock<Option<DateTime<Utc>>>,
}

impl Default for TierStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TierStore {
    pub fn new() -> Self {
        Self {
            short_term: RwLock::new(HashMap::new()),
            long_term: RwLock::new(HashMap::new()),
            episodic: RwLock::new(VecDeque::new()),
            semantic: RwLock::new(HashMap::new()),
            working: RwLock::new(HashMap::new()),
            pending: Mutex::new(VecDeque::new()),
            last_consolidation: RwLock::new(None),
        }
    }

    // ── Ingestion writes ───────────────────────────────────────

    /// Admit a fresh record into short-term and episodic memory, and into
    /// working memory when a relevance score is supplied. Each tier insert
    /// is atomic under that tier's write lock, so a concurrent reader never
    /// observes a partially-written record.
    pub fn admit(&self, record: MemoryRecord, working_relevance: Option<f64>, enqueue: bool) {
        self.short_term
            .write()
            .insert(record.id.clone(), record.clone());
        self.episodic.write().push_back(record.clone());
        if let Some(relevance) = working_relevance {
            self.working.write().insert(
                record.id.clone(),
                WorkingRecord {
                    record: record.clone(),
                    relevance,
                },
            );
        }
        if enqueue {
            self.pending.lock().push_back(record.id);
        }
    }

    /// Insert a standalone fact into semantic memory.
    pub fn insert_semantic(&self, record: MemoryRecord) {
        self.semantic.write().insert(record.id.clone(), record);
    }

    // ── Reads ──────────────────────────────────────────────────

    /// Look up a record by id in the given tier.
    pub fn get(&self, id: &str, tier: Tier) -> Option<MemoryRecord> {
        match tier {
            Tier::ShortTerm => self.short_term.read().get(id).cloned(),
            Tier::LongTerm => self.long_term.read().get(id).map(|c| c.record.clone()),
            Tier::Episodic => self
                .episodic
                .read()
                .iter()
                .rev()
                .find(|r| r.id == id)
                .cloned(),
            Tier::Semantic => self.semantic.read().get(id).cloned(),
            Tier::Working => self.working.read().get(id).map(|w| w.record.clone()),
        }
    }

    /// The last `n` episodic entries, most-recent-first.
    pub fn recent(&self, n: usize) -> Vec<MemoryRecord> {
        self.episodic.read().iter().rev().take(n).cloned().collect()
    }

    /// Scan a tier under its read lock, keeping records the closure scores.
    /// Records without an embedding still reach the closure; it decides.
    pub fn scan<F>(&self, tier: Tier, mut keep: F) -> Vec<(MemoryRecord, f32)>
    where
        F: FnMut(&MemoryRecord) -> Option<f32>,
    {
        match tier {
            Tier::ShortTerm => self
                .short_term
                .read()
                .values()
                .filter_map(|r| keep(r).map(|s| (r.clone(), s)))
                .collect(),
            Tier::LongTerm => self
                .long_term
                .read()
                .values()
                .filter_map(|c| keep(&c.record).map(|s| (c.record.clone(), s)))
                .collect(),
            Tier::Episodic => self
                .episodic
                .read()
                .iter()
                .filter_map(|r| keep(r).map(|s| (r.clone(), s)))
                .collect(),
            Tier::Semantic => self
                .semantic
                .read()
                .values()
                .filter_map(|r| keep(r).map(|s| (r.clone(), s)))
                .collect(),
            Tier::Working => self
                .working
                .read()
                .values()
                .filter_map(|w| keep(&w.record).map(|s| (w.record.clone(), s)))
                .collect(),
        }
    }

    /// Ids of short-term records matching a predicate.
    pub fn short_term_matching<F>(&self, mut pred: F) -> Vec<String>
    where
        F: FnMut(&MemoryRecord) -> bool,
    {
        self.short_term
            .read()
            .values()
            .filter(|r| pred(r))
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn long_term_contains(&self, id: &str) -> bool {
        self.long_term.read().contains_key(id)
    }

    /// Long-term access bookkeeping for a retrieval hit.
    pub fn touch_long_term(&self, ids: &[String], now: DateTime<Utc>) {
        let mut long_term = self.long_term.write();
        for id in ids {
            if let Some(entry) = long_term.get_mut(id) {
                entry.access_count += 1;
                entry.last_accessed = Some(now);
            }
        }
    }

    /// Access bookkeeping view — used by tests and the status surface.
    pub fn long_term_entry(&self, id: &str) -> Option<ConsolidatedRecord> {
        self.long_term.read().get(id).cloned()
    }

    pub fn working_entry(&self, id: &str) -> Option<WorkingRecord> {
        self.working.read().get(id).cloned()
    }

    // ── Promotion ──────────────────────────────────────────────

    /// Move a record from short-term into long-term memory. Idempotent: an
    /// id already consolidated is a no-op, as is an id no longer resident
    /// in short-term. Lock order: ShortTerm, then LongTerm.
    pub fn promote(&self, id: &str, now: DateTime<Utc>) -> bool {
        let mut short_term = self.short_term.write();
        let mut long_term = self.long_term.write();
        if long_term.contains_key(id) {
            short_term.remove(id);
            return false;
        }
        let Some(record) = short_term.remove(id) else {
            return false;
        };
        long_term.insert(
            id.to_string(),
            ConsolidatedRecord {
                record,
                consolidated_at: now,
                access_count: 0,
                last_accessed: None,
            },
        );
        true
    }

    pub fn mark_consolidated(&self, at: DateTime<Utc>) {
        *self.last_consolidation.write() = Some(at);
    }

    // ── Queue ──────────────────────────────────────────────────

    pub fn drain_pending(&self) -> Vec<String> {
        self.pending.lock().drain(..).collect()
    }

    pub fn queue_depth(&self) -> usize {
        self.pending.lock().len()
    }

    // ── Eviction ───────────────────────────────────────────────

    /// Remove the given ids from short-term memory. Returns how many were
    /// actually resident.
    pub fn evict_short_term(&self, ids: &[String]) -> usize {
        let mut short_term = self.short_term.write();
        ids.iter()
            .filter(|id| short_term.remove(id.as_str()).is_some())
            .count()
    }

    /// Truncate the episodic log from the head (oldest first) down to
    /// `max_episodes`. Returns how many entries were dropped.
    pub fn truncate_episodic(&self, max_episodes: usize) -> usize {
        let mut episodic = self.episodic.write();
        let mut dropped = 0;
        while episodic.len() > max_episodes {
            episodic.pop_front();
            dropped += 1;
        }
        dropped
    }

    /// Recompute every working record's relevance with decay at `now`, then
    /// keep only the top `max_items` by relevance. Returns how many were
    /// dropped.
    pub fn trim_working(&self, max_items: usize, half_life_secs: u64, now: DateTime<Utc>) -> usize {
        let mut working = self.working.write();
        for entry in working.values_mut() {
            entry.relevance = importance::working_relevance(
                entry.record.importance,
                entry.record.age(now),
                half_life_secs,
            );
        }
        if working.len() <= max_items {
            return 0;
        }
        let mut ranked: Vec<(String, f64)> = working
            .iter()
            .map(|(id, w)| (id.clone(), w.relevance))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let dropped: Vec<String> = ranked[max_items..].iter().map(|(id, _)| id.clone()).collect();
        for id in &dropped {
            working.remove(id);
        }
        dropped.len()
    }

    // ── Status & snapshots ─────────────────────────────────────

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            short_term: self.short_term.read().len(),
            long_term: self.long_term.read().len(),
            episodic: self.episodic.read().len(),
            semantic: self.semantic.read().len(),
            working: self.working.read().len(),
            consolidation_queue_depth: self.queue_depth(),
            last_consolidation: *self.last_consolidation.read(),
        }
    }

    /// Read-locked copies of the durable tiers. Locks are taken one tier at
    /// a time and released before any serialization or I/O happens.
    pub fn export(&self, max_episodes: usize) -> TierExport {
        let short_term: Vec<MemoryRecord> = self.short_term.read().values().cloned().collect();
        let long_term: Vec<ConsolidatedRecord> = self.long_term.read().values().cloned().collect();
        let episodic: Vec<MemoryRecord> = {
            let episodic = self.episodic.read();
            let skip = episodic.len().saturating_sub(max_episodes);
            episodic.iter().skip(skip).cloned().collect()
        };
        let semantic: Vec<MemoryRecord> = self.semantic.read().values().cloned().collect();
        TierExport {
            short_term,
            long_term,
            episodic,
            semantic,
        }
    }

    /// Replace the durable tiers with previously exported contents. Working
    /// memory is session-scoped and starts empty.
    pub fn import(&self, export: TierExport) {
        *self.short_term.write() = export
            .short_term
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        *self.long_term.write() = export
            .long_term
            .into_iter()
            .map(|c| (c.record.id.clone(), c))
            .collect();
        *self.episodic.write() = export.episodic.into();
        *self.semantic.write() = export
            .semantic
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
    }
}

/// Point-in-time copy of the four durable tiers.
#[derive(Debug, Clone, Default)]
pub struct TierExport {
    pub short_term: Vec<MemoryRecord>,
    pub long_term: Vec<ConsolidatedRecord>,
    pub episodic: Vec<MemoryRecord>,
    pub semantic: Vec<MemoryRecord>,
}
