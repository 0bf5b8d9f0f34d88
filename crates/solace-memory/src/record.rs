use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The five memory tiers, each with its own retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    ShortTerm,
    LongTerm,
    Episodic,
    Semantic,
    Working,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
            Self::Episodic => "episodic",
            Self::Semantic => "semantic",
            Self::Working => "working",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Ingestion boundary ─────────────────────────────────────────

/// Emotion summary attached to an interaction by the upstream scoring engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionSignal {
    pub primary: String,
    /// Intensity in [0,1].
    pub intensity: f64,
}

/// Decision summary attached to an interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSignal {
    #[serde(rename = "type")]
    pub kind: String,
    /// Confidence in [0,1].
    pub confidence: f64,
}

/// Reasoning summary attached to an interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicSignal {
    pub conclusions: Vec<String>,
}

/// User feedback attached to an interaction. Used only for importance
/// scoring, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSignal {
    /// Satisfaction in [0,1].
    pub satisfaction: f64,
}

/// What the upstream engines hand to [`crate::MemoryStore::ingest`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interaction {
    pub input: String,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    #[serde(default)]
    pub emotion: Option<EmotionSignal>,
    #[serde(default)]
    pub decision: Option<DecisionSignal>,
    #[serde(default)]
    pub logic: Option<LogicSignal>,
    #[serde(default)]
    pub feedback: Option<FeedbackSignal>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl Interaction {
    /// Convenience constructor for plain text input.
    pub fn text(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }
}

// ── Stored records ─────────────────────────────────────────────

/// Small derived digest used for filtering, computed once at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub session_id: Option<String>,
    pub dominant_emotion: Option<String>,
    pub decision_type: Option<String>,
    /// Complexity estimate in [0,1].
    pub complexity: f64,
}

/// The core memory entity. All fields except tier-side bookkeeping are
/// immutable once the record is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub input: String,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    #[serde(default)]
    pub emotion: Option<EmotionSignal>,
    #[serde(default)]
    pub decision: Option<DecisionSignal>,
    #[serde(default)]
    pub logic: Option<LogicSignal>,
    pub timestamp: DateTime<Utc>,
    /// Importance in [0,1], computed once at ingestion.
    pub importance: f64,
    /// Fixed-dimension embedding, absent if embedding generation failed.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    pub context: ContextSummary,
}

impl MemoryRecord {
    /// Age of the record relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.timestamp
    }
}

/// A record resident in long-term memory. Access bookkeeping is updated on
/// every retrieval hit; everything else is frozen at consolidation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    #[serde(flatten)]
    pub record: MemoryRecord,
    pub consolidated_at: DateTime<Utc>,
    pub access_count: u64,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
}

/// A record resident in working memory, ranked by time-decaying relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingRecord {
    #[serde(flatten)]
    pub record: MemoryRecord,
    pub relevance: f64,
}

// ── Boundary views ─────────────────────────────────────────────

/// What retrieval and the recent-interactions boundary hand back to callers.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryView {
    pub id: String,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub importance: f64,
    pub tier: Tier,
    /// Cosine similarity to the query, present only on retrieval results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextSummary>,
}

impl MemoryView {
    pub fn from_record(
        record: &MemoryRecord,
        tier: Tier,
        similarity: Option<f32>,
        include_context: bool,
    ) -> Self {
        Self {
            id: record.id.clone(),
            input: record.input.clone(),
            response: record.response.clone(),
            timestamp: record.timestamp,
            importance: record.importance,
            tier,
            similarity,
            context: include_context.then(|| record.context.clone()),
        }
    }
}

/// Per-tier counts and consolidation state, for the status boundary.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub short_term: usize,
    pub long_term: usize,
    pub episodic: usize,
    pub semantic: usize,
    pub working: usize,
    pub consolidation_queue_depth: usize,
    pub last_consolidation: Option<DateTime<Utc>>,
}
