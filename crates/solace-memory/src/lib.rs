//! # solace-memory
//!
//! Tiered memory system for the Solace assistant:
//!
//! - **Short-term memory**: recent interactions (in-memory, session-scoped).
//! - **Long-term memory**: consolidated important interactions (durable).
//! - **Episodic memory**: bounded append-only log of everything ingested.
//! - **Semantic memory**: standalone learned facts.
//! - **Working memory**: small relevance-ranked set of what matters right now.
//!
//! Records are scored for importance at ingestion, embedded for similarity
//! search, promoted between tiers by a background consolidation pass, trimmed
//! by a background eviction pass, and snapshotted to disk periodically and on
//! shutdown.

pub mod consolidation;
pub mod embedding;
pub mod eviction;
pub mod importance;
pub mod persistence;
pub mod record;
pub mod retrieval;
pub mod store;
pub mod tiers;

pub use embedding::{EmbeddingProvider, HashEmbedder, cosine_similarity};
pub use record::{
    ConsolidatedRecord, ContextSummary, DecisionSignal, EmotionSignal, FeedbackSignal,
    Interaction, LogicSignal, MemoryRecord, MemoryView, StoreStatus, Tier, WorkingRecord,
};
pub use retrieval::{RetrievalResult, RetrieveOptions, TimeRange};
pub use store::{Ingested, MemoryStore};
pub use tiers::TierStore;
