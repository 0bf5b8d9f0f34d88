//! The memory store facade: ingestion, retrieval, status, persistence, and
//! the background maintenance lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use solace_config::MemoryConfig;
use solace_core::{Result, SolaceError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::consolidation::{self, ConsolidationReport};
use crate::embedding::{EmbeddingProvider, HashEmbedder};
use crate::eviction::{self, EvictionReport};
use crate::importance;
use crate::persistence::SnapshotFiles;
use crate::record::{Interaction, MemoryRecord, MemoryView, StoreStatus, Tier};
use crate::retrieval::{self, RetrievalResult, RetrieveOptions};
use crate::tiers::TierStore;

/// Working-memory admission: importance floor, complexity floor, and the
/// recency window that every freshly ingested record satisfies.
const WORKING_IMPORTANCE_FLOOR: f64 = 0.6;
const WORKING_COMPLEXITY_FLOOR: f64 = 0.7;
const WORKING_RECENCY_MINUTES: i64 = 10;

/// Snapshots keep at most this many episodic entries (the most recent ones).
const EPISODIC_SNAPSHOT_LIMIT: usize = 1000;

/// Outcome of an ingest call: the assigned id, plus a warning when the
/// record was stored without an embedding.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub id: String,
    pub warning: Option<String>,
}

/// Unified memory store combining all five tiers with background
/// consolidation, eviction, and autosave.
pub struct MemoryStore {
    tiers: Arc<TierStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    snapshots: Arc<SnapshotFiles>,
    config: MemoryConfig,
    closed: Arc<AtomicBool>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl MemoryStore {
    /// Open a store with the default deterministic hash embedder, restoring
    /// any snapshot artifacts found in the configured data directory.
    pub fn open(config: MemoryConfig) -> Self {
        let dims = config.embedding_dims;
        Self::open_with_embedder(config, Arc::new(HashEmbedder::new(dims)))
    }

    /// Open a store with a custom embedding provider.
    pub fn open_with_embedder(config: MemoryConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        info!(
            data_dir = %config.data_dir.display(),
            store_id = %config.store_id,
            "opening memory store"
        );
        let snapshots = SnapshotFiles::new(config.data_dir.clone(), config.store_id.clone());
        let tiers = TierStore::new();
        tiers.import(snapshots.load());

        Self {
            tiers: Arc::new(tiers),
            embedder,
            snapshots: Arc::new(snapshots),
            config,
            closed: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Direct access to the tier collections.
    pub fn tiers(&self) -> &TierStore {
        &self.tiers
    }

    // ── Ingestion ──────────────────────────────────────────────

    /// Ingest an interaction: score it, embed it, and write it into
    /// short-term and episodic memory (plus working memory when it
    /// qualifies). Returns the assigned id; an embedding failure is a
    /// warning, not a failure of the call.
    pub fn ingest(&self, interaction: Interaction) -> Result<Ingested> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SolaceError::ShutDown);
        }
        if interaction.input.trim().is_empty() {
            return Err(SolaceError::EmptyPayload);
        }

        let complexity = importance::complexity(&interaction);
        let score = importance::score(&interaction, complexity);
        let context = importance::summarize(&interaction, complexity);

        let mut warning = None;
        let embedding = match self.embedder.embed(&interaction.input) {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(error = %e, "embedding failed, record stored without one");
                warning = Some(e.to_string());
                None
            }
        };

        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            input: interaction.input,
            response: interaction.response,
            emotion: interaction.emotion,
            decision: interaction.decision,
            logic: interaction.logic,
            timestamp: Utc::now(),
            importance: score,
            embedding,
            context,
        };
        let id = record.id.clone();

        // Fresh records always satisfy the recency clause; the other two
        // clauses matter for records re-admitted later.
        let age = record.age(Utc::now());
        let admit_working = record.importance > WORKING_IMPORTANCE_FLOOR
            || record.context.complexity > WORKING_COMPLEXITY_FLOOR
            || age < chrono::Duration::minutes(WORKING_RECENCY_MINUTES);
        let relevance = admit_working.then(|| {
            importance::working_relevance(record.importance, age, self.config.working_half_life_secs)
        });

        let enqueue = record.importance >= self.config.long_term_threshold;
        self.tiers.admit(record, relevance, enqueue);

        debug!(%id, importance = score, enqueued = enqueue, "interaction ingested");
        Ok(Ingested { id, warning })
    }

    /// Store a standalone learned fact in semantic memory. Importance is the
    /// caller's confidence in the fact.
    pub fn ingest_fact(
        &self,
        statement: &str,
        confidence: f64,
        session_id: Option<String>,
    ) -> Result<Ingested> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SolaceError::ShutDown);
        }
        if statement.trim().is_empty() {
            return Err(SolaceError::EmptyPayload);
        }

        let mut warning = None;
        let embedding = match self.embedder.embed(statement) {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(error = %e, "embedding failed, fact stored without one");
                warning = Some(e.to_string());
                None
            }
        };

        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            input: statement.to_string(),
            response: None,
            emotion: None,
            decision: None,
            logic: None,
            timestamp: Utc::now(),
            importance: confidence.clamp(0.0, 1.0),
            embedding,
            context: crate::record::ContextSummary {
                session_id,
                ..Default::default()
            },
        };
        let id = record.id.clone();
        self.tiers.insert_semantic(record);

        debug!(%id, confidence, "fact stored");
        Ok(Ingested { id, warning })
    }

    // ── Reads ──────────────────────────────────────────────────

    /// Similarity search across the requested tiers.
    pub fn retrieve(&self, query: &str, options: &RetrieveOptions) -> Result<RetrievalResult> {
        retrieval::search(&self.tiers, self.embedder.as_ref(), query, options)
    }

    /// The last `n` interactions, most-recent-first.
    pub fn recent(&self, n: usize) -> Vec<MemoryView> {
        self.tiers
            .recent(n)
            .iter()
            .map(|r| MemoryView::from_record(r, Tier::Episodic, None, true))
            .collect()
    }

    /// Look up a record by id in a specific tier.
    pub fn get(&self, id: &str, tier: Tier) -> Option<MemoryView> {
        self.tiers
            .get(id, tier)
            .map(|r| MemoryView::from_record(&r, tier, None, true))
    }

    pub fn status(&self) -> StoreStatus {
        self.tiers.status()
    }

    // ── Maintenance ────────────────────────────────────────────

    /// Run one consolidation pass immediately.
    pub fn consolidate_now(&self) -> ConsolidationReport {
        consolidation::run_pass(&self.tiers, &self.config, Utc::now())
    }

    /// Run one eviction pass immediately.
    pub fn evict_now(&self) -> EvictionReport {
        eviction::run_pass(&self.tiers, &self.config, Utc::now())
    }

    /// Snapshot all durable tiers to disk. Tier locks are released before
    /// any file I/O starts.
    pub fn save(&self) -> Result<()> {
        let export = self.tiers.export(EPISODIC_SNAPSHOT_LIMIT);
        self.snapshots.save(&export)
    }

    /// Replace in-memory state with the snapshot artifacts on disk.
    pub fn load(&self) {
        self.tiers.import(self.snapshots.load());
    }

    // ── Background lifecycle ───────────────────────────────────

    /// Start the three periodic maintenance tasks: consolidation, eviction,
    /// and autosave. A wake that fires while the previous pass is still
    /// running is skipped, not queued.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            return;
        }

        {
            let tiers = Arc::clone(&self.tiers);
            let config = self.config.clone();
            tasks.push(spawn_periodic(
                "consolidation",
                Duration::from_secs(self.config.consolidation_interval_secs),
                self.cancel.clone(),
                move || {
                    let report = consolidation::run_pass(&tiers, &config, Utc::now());
                    if report.total() > 0 {
                        info!(promoted = report.promoted, swept = report.swept, "consolidated");
                    }
                },
            ));
        }
        {
            let tiers = Arc::clone(&self.tiers);
            let config = self.config.clone();
            tasks.push(spawn_periodic(
                "eviction",
                Duration::from_secs(self.config.eviction_interval_secs),
                self.cancel.clone(),
                move || {
                    let report = eviction::run_pass(&tiers, &config, Utc::now());
                    if report.total() > 0 {
                        info!(
                            short_term = report.short_term_evicted,
                            episodic = report.episodic_truncated,
                            working = report.working_trimmed,
                            "evicted"
                        );
                    }
                },
            ));
        }
        {
            let tiers = Arc::clone(&self.tiers);
            let snapshots = Arc::clone(&self.snapshots);
            tasks.push(spawn_periodic(
                "autosave",
                Duration::from_secs(self.config.autosave_interval_secs),
                self.cancel.clone(),
                move || {
                    let export = tiers.export(EPISODIC_SNAPSHOT_LIMIT);
                    if let Err(e) = snapshots.save(&export) {
                        warn!(error = %e, "autosave failed, next pass will retry");
                    }
                },
            ));
        }
        info!("background maintenance started");
    }

    /// Stop scheduling background passes, wait for any in-flight pass to
    /// finish, then perform one final save. A save failure is returned but
    /// shutdown still completes.
    pub async fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        info!("memory store shut down, writing final snapshot");
        self.save()
    }
}

/// A periodic background task: sleeps between runs, performs one full pass
/// per wake, and skips (never queues) wakes that fire while a pass is still
/// running.
fn spawn_periodic<F>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut pass: F,
) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;
        debug!(task = name, period_secs = period.as_secs(), "background task started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(task = name, "background task stopped");
                    break;
                }
                _ = interval.tick() => {
                    pass();
                }
            }
        }
    })
}
