//! Importance and relevance scoring.
//!
//! Importance is computed once at ingestion and never changes. The score is
//! a weighted sum of the signals the upstream engines attach to an
//! interaction, clamped to [0,1] and monotonic non-decreasing in each
//! positive signal.

use chrono::Duration;

use crate::record::{ContextSummary, Interaction};

const BASE: f64 = 0.3;
const W_INTENSITY: f64 = 0.4;
const W_CONFIDENCE: f64 = 0.2;
const W_SATISFACTION: f64 = 0.15;
const W_COMPLEXITY: f64 = 0.1;

/// Score an interaction's importance in [0,1].
pub fn score(interaction: &Interaction, complexity: f64) -> f64 {
    let mut score = BASE;
    if let Some(ref emotion) = interaction.emotion {
        score += W_INTENSITY * emotion.intensity.clamp(0.0, 1.0);
    }
    if let Some(ref decision) = interaction.decision {
        score += W_CONFIDENCE * decision.confidence.clamp(0.0, 1.0);
    }
    if let Some(ref feedback) = interaction.feedback {
        score += W_SATISFACTION * feedback.satisfaction.clamp(0.0, 1.0);
    }
    score += W_COMPLEXITY * complexity.clamp(0.0, 1.0);
    score.clamp(0.0, 1.0)
}

/// Estimate an interaction's complexity in [0,1] from the size of its input
/// and the amount of reasoning attached to it.
pub fn complexity(interaction: &Interaction) -> f64 {
    let length_factor = (interaction.input.len() as f64 / 500.0).min(1.0);
    let conclusions = interaction
        .logic
        .as_ref()
        .map(|l| l.conclusions.len())
        .unwrap_or(0);
    let reasoning_factor = (conclusions as f64 / 5.0).min(1.0);
    // Latency is a weak proxy for how much work the pipeline did.
    let latency_factor = interaction
        .processing_time_ms
        .map(|ms| (ms as f64 / 5000.0).min(1.0))
        .unwrap_or(0.0);
    (length_factor * 0.5 + reasoning_factor * 0.3 + latency_factor * 0.2).clamp(0.0, 1.0)
}

/// Build the derived context digest for a fresh record.
pub fn summarize(interaction: &Interaction, complexity: f64) -> ContextSummary {
    ContextSummary {
        session_id: interaction.session_id.clone(),
        dominant_emotion: interaction.emotion.as_ref().map(|e| e.primary.clone()),
        decision_type: interaction.decision.as_ref().map(|d| d.kind.clone()),
        complexity,
    }
}

/// Exponential decay factor in (0,1] for the given age and half-life.
pub fn decay(age: Duration, half_life_secs: u64) -> f64 {
    if half_life_secs == 0 {
        return 0.0;
    }
    let age_secs = age.num_milliseconds().max(0) as f64 / 1000.0;
    0.5_f64.powf(age_secs / half_life_secs as f64)
}

/// Working-memory relevance: importance plus a recency bonus that decays
/// with the configured half-life. Clamped to [0,1].
pub fn working_relevance(importance: f64, age: Duration, half_life_secs: u64) -> f64 {
    (importance + decay(age, half_life_secs) * 0.2).clamp(0.0, 1.0)
}
