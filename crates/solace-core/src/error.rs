use thiserror::Error;

/// Unified error type for the Solace memory engine.
#[derive(Error, Debug)]
pub enum SolaceError {
    // ── Ingestion errors ───────────────────────────────────────
    #[error("empty payload: an interaction must carry input text")]
    EmptyPayload,

    #[error("store is shut down")]
    ShutDown,

    // ── Embedding errors ───────────────────────────────────────
    #[error("embedding failed: {0}")]
    Embedding(String),

    // ── Persistence errors ─────────────────────────────────────
    #[error("snapshot write failed: {path}: {reason}")]
    SnapshotWrite { path: String, reason: String },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SolaceError>;
