use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration — maps to `solace.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolaceConfig {
    pub memory: MemoryConfig,
    pub logging: LoggingConfig,
}

// ── Memory ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Directory holding the snapshot artifacts.
    pub data_dir: PathBuf,
    /// Store identifier — namespaces the snapshot artifacts on disk.
    pub store_id: String,
    /// Embedding dimensions, fixed for the process lifetime.
    pub embedding_dims: usize,
    /// Importance threshold at or above which a record is consolidated
    /// into long-term memory.
    pub long_term_threshold: f64,
    /// Short-term records older than this are evictable (unless they are
    /// still awaiting consolidation).
    pub short_term_retention_hours: u64,
    /// Consolidation sweep age floor: short-term records older than this
    /// with importance at or above the threshold are promoted even if
    /// their queue entry was lost.
    pub sweep_age_hours: u64,
    /// Maximum number of episodic entries retained.
    pub max_episodes: usize,
    /// Maximum number of working-memory items retained.
    pub max_working_items: usize,
    /// Half-life of working-memory relevance decay.
    pub working_half_life_secs: u64,
    /// Period of the background consolidation pass.
    pub consolidation_interval_secs: u64,
    /// Period of the background eviction pass.
    pub eviction_interval_secs: u64,
    /// Period of the background snapshot save.
    pub autosave_interval_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("memory"),
            store_id: "default".into(),
            embedding_dims: 128,
            long_term_threshold: 0.7,
            short_term_retention_hours: 24,
            sweep_age_hours: 2,
            max_episodes: 1000,
            max_working_items: 100,
            working_half_life_secs: 3600,
            consolidation_interval_secs: 3600,
            eviction_interval_secs: 86_400,
            autosave_interval_secs: 300,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
    /// Log file path (None = stdout only).
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
            file: None,
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Warning,
    Error,
}

/// A validation finding: the offending field, what is wrong, and how to fix it.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl SolaceConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();
        let mem = &self.memory;

        // ── Threshold ───
        if !(0.0..=1.0).contains(&mem.long_term_threshold) {
            warnings.push(ConfigWarning {
                field: "memory.long_term_threshold".into(),
                message: format!("threshold {} is out of range", mem.long_term_threshold),
                severity: WarningSeverity::Error,
                hint: Some("Importance is a [0,1] scalar; use e.g. 0.7".into()),
            });
        }

        // ── Embedding dimensions ───
        if mem.embedding_dims == 0 {
            warnings.push(ConfigWarning {
                field: "memory.embedding_dims".into(),
                message: "embedding_dims is 0 — similarity search cannot work".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 128".into()),
            });
        }

        // ── Capacities ───
        if mem.max_episodes == 0 {
            warnings.push(ConfigWarning {
                field: "memory.max_episodes".into(),
                message: "max_episodes is 0 — every ingest is truncated away".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 1000".into()),
            });
        }
        if mem.max_working_items == 0 {
            warnings.push(ConfigWarning {
                field: "memory.max_working_items".into(),
                message: "max_working_items is 0 — working memory is disabled".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 100".into()),
            });
        }

        // ── Schedules ───
        if mem.autosave_interval_secs < 10 {
            warnings.push(ConfigWarning {
                field: "memory.autosave_interval_secs".into(),
                message: format!(
                    "autosave every {}s will thrash the disk",
                    mem.autosave_interval_secs
                ),
                severity: WarningSeverity::Warning,
                hint: Some("Use 300 (5 minutes) unless testing".into()),
            });
        }

        // ── Log level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| w.to_string())
            .collect();
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors.join("\n"))
        }
    }
}
