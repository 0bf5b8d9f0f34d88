#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use solace_memory::record::{ContextSummary, MemoryRecord};
    use uuid::Uuid;

    fn make_record(
        input: &str,
        importance: f64,
        age_hours: i64,
        embedding: Option<Vec<f32>>,
    ) -> MemoryRecord {
        MemoryRecord {
            id: Uuid::new_v4().to_string(),
            input: input.to_string(),
            response: None,
            emotion: None,
            decision: None,
            logic: None,
            timestamp: Utc::now() - Duration::hours(age_hours),
            importance,
            embedding,
            context: ContextSummary::default(),
        }
    }

    // ── Importance Scoring ─────────────────────────────────────

    mod importance_scoring {
        use rand::Rng;
        use rand::RngExt;
        use solace_memory::importance;
        use solace_memory::record::{
            DecisionSignal, EmotionSignal, FeedbackSignal, Interaction,
        };

        fn random_interaction(rng: &mut impl Rng) -> Interaction {
            let mut interaction = Interaction::text("x".repeat(rng.random_range(1..2000)));
            if rng.random_bool(0.5) {
                interaction.emotion = Some(EmotionSignal {
                    primary: "joy".into(),
                    // Deliberately out of range sometimes; the scorer clamps.
                    intensity: rng.random_range(-0.5..1.5),
                });
            }
            if rng.random_bool(0.5) {
                interaction.decision = Some(DecisionSignal {
                    kind: "reactive".into(),
                    confidence: rng.random_range(-0.5..1.5),
                });
            }
            if rng.random_bool(0.5) {
                interaction.feedback = Some(FeedbackSignal {
                    satisfaction: rng.random_range(-0.5..1.5),
                });
            }
            if rng.random_bool(0.5) {
                interaction.processing_time_ms = Some(rng.random_range(0..60_000));
            }
            interaction
        }

        #[test]
        fn test_score_always_in_unit_interval() {
            let mut rng = rand::rng();
            for _ in 0..500 {
                let interaction = random_interaction(&mut rng);
                let complexity = importance::complexity(&interaction);
                let score = importance::score(&interaction, complexity);
                assert!((0.0..=1.0).contains(&score), "score {score} out of range");
                assert!((0.0..=1.0).contains(&complexity));
            }
        }

        #[test]
        fn test_score_monotonic_in_intensity() {
            let base = Interaction::text("same input text");
            let complexity = importance::complexity(&base);
            let mut low = base.clone();
            low.emotion = Some(EmotionSignal {
                primary: "calm".into(),
                intensity: 0.2,
            });
            let mut high = base.clone();
            high.emotion = Some(EmotionSignal {
                primary: "calm".into(),
                intensity: 0.9,
            });
            assert!(importance::score(&high, complexity) >= importance::score(&low, complexity));
        }

        #[test]
        fn test_score_monotonic_in_satisfaction() {
            let base = Interaction::text("same input text");
            let complexity = importance::complexity(&base);
            let mut low = base.clone();
            low.feedback = Some(FeedbackSignal { satisfaction: 0.1 });
            let mut high = base.clone();
            high.feedback = Some(FeedbackSignal { satisfaction: 1.0 });
            assert!(importance::score(&high, complexity) >= importance::score(&low, complexity));
        }

        #[test]
        fn test_max_intensity_clears_consolidation_threshold() {
            let mut interaction = Interaction::text("remember this");
            interaction.emotion = Some(EmotionSignal {
                primary: "awe".into(),
                intensity: 1.0,
            });
            let complexity = importance::complexity(&interaction);
            assert!(importance::score(&interaction, complexity) >= 0.7);
        }
    }

    // ── Embedding ──────────────────────────────────────────────

    mod embedding {
        use solace_memory::{EmbeddingProvider, HashEmbedder, cosine_similarity};

        #[test]
        fn test_identical_content_identical_vector_across_instances() {
            let a = HashEmbedder::new(128).embed("water the plants on tuesday").unwrap();
            let b = HashEmbedder::new(128).embed("water the plants on tuesday").unwrap();
            assert_eq!(a, b);
            assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
        }

        #[test]
        fn test_dimension_matches_construction() {
            let embedder = HashEmbedder::new(64);
            assert_eq!(embedder.dimensions(), 64);
            assert_eq!(embedder.embed("hello world").unwrap().len(), 64);
        }
    }

    // ── Tier Store ─────────────────────────────────────────────

    mod tier_store {
        use super::*;
        use solace_memory::TierStore;
        use solace_memory::record::Tier;

        #[test]
        fn test_admit_writes_short_term_and_episodic() {
            let store = TierStore::new();
            let record = make_record("hello", 0.5, 0, None);
            let id = record.id.clone();
            store.admit(record, None, false);

            // Same id resident in both tiers — intentional duplication.
            assert!(store.get(&id, Tier::ShortTerm).is_some());
            assert!(store.get(&id, Tier::Episodic).is_some());
            assert!(store.get(&id, Tier::Working).is_none());
            assert_eq!(store.queue_depth(), 0);
        }

        #[test]
        fn test_admit_with_relevance_and_queue() {
            let store = TierStore::new();
            let record = make_record("important", 0.9, 0, None);
            let id = record.id.clone();
            store.admit(record, Some(0.95), true);

            assert!(store.get(&id, Tier::Working).is_some());
            assert_eq!(store.queue_depth(), 1);
            assert_eq!(store.drain_pending(), vec![id]);
            assert_eq!(store.queue_depth(), 0);
        }

        #[test]
        fn test_recent_most_recent_first() {
            let store = TierStore::new();
            for i in 0..5 {
                store.admit(make_record(&format!("entry {i}"), 0.5, 0, None), None, false);
            }
            let recent = store.recent(3);
            assert_eq!(recent.len(), 3);
            assert_eq!(recent[0].input, "entry 4");
            assert_eq!(recent[2].input, "entry 2");
        }

        #[test]
        fn test_promote_moves_record() {
            let store = TierStore::new();
            let record = make_record("promote me", 0.9, 0, None);
            let id = record.id.clone();
            store.admit(record, None, false);

            assert!(store.promote(&id, Utc::now()));
            assert!(store.get(&id, Tier::ShortTerm).is_none());
            let entry = store.long_term_entry(&id).unwrap();
            assert_eq!(entry.access_count, 0);
            assert!(entry.last_accessed.is_none());
            // The episodic log copy survives promotion.
            assert!(store.get(&id, Tier::Episodic).is_some());
        }

        #[test]
        fn test_promote_is_idempotent() {
            let store = TierStore::new();
            let record = make_record("once", 0.9, 0, None);
            let id = record.id.clone();
            store.admit(record, None, false);

            assert!(store.promote(&id, Utc::now()));
            assert!(!store.promote(&id, Utc::now()));
            assert!(!store.promote("no-such-id", Utc::now()));
            assert_eq!(store.status().long_term, 1);
        }

        #[test]
        fn test_evict_short_term_counts_resident_only() {
            let store = TierStore::new();
            let record = make_record("evictable", 0.2, 0, None);
            let id = record.id.clone();
            store.admit(record, None, false);

            let evicted = store.evict_short_term(&[id.clone(), "missing".into()]);
            assert_eq!(evicted, 1);
            assert!(store.get(&id, Tier::ShortTerm).is_none());
        }

        #[test]
        fn test_truncate_episodic_drops_oldest() {
            let store = TierStore::new();
            for i in 0..10 {
                store.admit(make_record(&format!("entry {i}"), 0.5, 0, None), None, false);
            }
            assert_eq!(store.truncate_episodic(6), 4);
            let recent = store.recent(100);
            assert_eq!(recent.len(), 6);
            // Oldest retained entry is entry 4; 0..=3 were truncated.
            assert_eq!(recent.last().unwrap().input, "entry 4");
        }

        #[test]
        fn test_trim_working_keeps_top_relevance() {
            let store = TierStore::new();
            let mut ids = Vec::new();
            for i in 0..6 {
                let record = make_record(&format!("w{i}"), i as f64 / 10.0, 0, None);
                ids.push(record.id.clone());
                store.admit(record, Some(i as f64 / 10.0), false);
            }
            let dropped = store.trim_working(3, 3600, Utc::now());
            assert_eq!(dropped, 3);
            // Highest-importance records survive (same age, so decay is equal).
            for id in &ids[3..] {
                assert!(store.working_entry(id).is_some());
            }
            for id in &ids[..3] {
                assert!(store.working_entry(id).is_none());
            }
        }
    }

    // ── Consolidation ──────────────────────────────────────────

    mod consolidation_pass {
        use super::*;
        use solace_config::MemoryConfig;
        use solace_memory::record::Tier;
        use solace_memory::{TierStore, consolidation};

        #[test]
        fn test_queued_record_promoted_with_zero_access() {
            let store = TierStore::new();
            let config = MemoryConfig::default();
            let record = make_record("vital", 0.9, 0, None);
            let id = record.id.clone();
            store.admit(record, None, true);

            let report = consolidation::run_pass(&store, &config, Utc::now());
            assert_eq!(report.promoted, 1);
            assert_eq!(report.swept, 0);
            let entry = store.long_term_entry(&id).unwrap();
            assert_eq!(entry.access_count, 0);
            assert!(store.get(&id, Tier::ShortTerm).is_none());
        }

        #[test]
        fn test_sweep_promotes_aged_important_records() {
            let store = TierStore::new();
            let config = MemoryConfig::default();
            // Aged past the sweep floor, important, but never queued.
            let record = make_record("forgotten but vital", 0.85, 3, None);
            let id = record.id.clone();
            store.admit(record, None, false);

            let report = consolidation::run_pass(&store, &config, Utc::now());
            assert_eq!(report.promoted, 0);
            assert_eq!(report.swept, 1);
            assert!(store.long_term_contains(&id));
        }

        #[test]
        fn test_sweep_skips_fresh_and_unimportant() {
            let store = TierStore::new();
            let config = MemoryConfig::default();
            // Important but fresh: below the sweep age floor, not queued.
            store.admit(make_record("fresh vital", 0.9, 0, None), None, false);
            // Aged but unimportant.
            store.admit(make_record("old trivia", 0.2, 5, None), None, false);

            let report = consolidation::run_pass(&store, &config, Utc::now());
            assert_eq!(report.total(), 0);
            assert_eq!(store.status().long_term, 0);
        }

        #[test]
        fn test_pass_is_idempotent() {
            let store = TierStore::new();
            let config = MemoryConfig::default();
            store.admit(make_record("vital", 0.9, 0, None), None, true);

            assert_eq!(consolidation::run_pass(&store, &config, Utc::now()).total(), 1);
            assert_eq!(consolidation::run_pass(&store, &config, Utc::now()).total(), 0);
            assert_eq!(store.status().long_term, 1);
        }

        #[test]
        fn test_pass_records_timestamp() {
            let store = TierStore::new();
            let config = MemoryConfig::default();
            assert!(store.status().last_consolidation.is_none());
            consolidation::run_pass(&store, &config, Utc::now());
            assert!(store.status().last_consolidation.is_some());
        }
    }

    // ── Eviction ───────────────────────────────────────────────

    mod eviction_pass {
        use super::*;
        use solace_config::MemoryConfig;
        use solace_memory::record::Tier;
        use solace_memory::{TierStore, eviction};

        #[test]
        fn test_short_term_age_policy_spares_important_records() {
            let store = TierStore::new();
            let config = MemoryConfig::default();
            let stale = make_record("old trivia", 0.2, 30, None);
            let stale_id = stale.id.clone();
            // Old and important: must wait for consolidation, never evicted.
            let vital = make_record("old but vital", 0.9, 30, None);
            let vital_id = vital.id.clone();
            let fresh = make_record("fresh trivia", 0.2, 1, None);
            let fresh_id = fresh.id.clone();
            store.admit(stale, None, false);
            store.admit(vital, None, false);
            store.admit(fresh, None, false);

            let report = eviction::run_pass(&store, &config, Utc::now());
            assert_eq!(report.short_term_evicted, 1);
            assert!(store.get(&stale_id, Tier::ShortTerm).is_none());
            assert!(store.get(&vital_id, Tier::ShortTerm).is_some());
            assert!(store.get(&fresh_id, Tier::ShortTerm).is_some());
        }

        #[test]
        fn test_episodic_bound_keeps_most_recent() {
            let store = TierStore::new();
            let mut config = MemoryConfig::default();
            config.max_episodes = 1000;
            for i in 0..1100 {
                store.admit(make_record(&format!("entry {i}"), 0.5, 0, None), None, false);
            }

            let report = eviction::run_pass(&store, &config, Utc::now());
            assert_eq!(report.episodic_truncated, 100);
            let status = store.status();
            assert_eq!(status.episodic, 1000);
            // The oldest 100 are gone; entry 100 is now the oldest.
            let recent = store.recent(1000);
            assert_eq!(recent[0].input, "entry 1099");
            assert_eq!(recent.last().unwrap().input, "entry 100");
        }

        #[test]
        fn test_working_bound_keeps_top_relevance() {
            let store = TierStore::new();
            let mut config = MemoryConfig::default();
            config.max_working_items = 100;
            for i in 0..150 {
                let importance = i as f64 / 150.0;
                let record = make_record(&format!("w{i}"), importance, 0, None);
                store.admit(record, Some(importance), false);
            }

            let report = eviction::run_pass(&store, &config, Utc::now());
            assert_eq!(report.working_trimmed, 50);
            let status = store.status();
            assert_eq!(status.working, 100);
        }

        #[test]
        fn test_eviction_under_capacity_is_noop() {
            let store = TierStore::new();
            let config = MemoryConfig::default();
            store.admit(make_record("one", 0.5, 0, None), Some(0.5), false);
            let report = eviction::run_pass(&store, &config, Utc::now());
            assert_eq!(report.total(), 0);
        }
    }

    // ── Retrieval Ranking ──────────────────────────────────────

    mod ranking {
        use super::*;
        use solace_core::Result;
        use solace_memory::record::Tier;
        use solace_memory::retrieval::{self, RetrieveOptions, TimeRange};
        use solace_memory::{EmbeddingProvider, TierStore};

        /// Embeds every query to the same fixed unit vector, so record
        /// similarities can be dialed in exactly via their stored vectors.
        struct FixedEmbedder;

        impl EmbeddingProvider for FixedEmbedder {
            fn dimensions(&self) -> usize {
                3
            }
            fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                Ok(vec![1.0, 0.0, 0.0])
            }
        }

        /// Unit vector at cosine similarity `s` to the query vector.
        fn vector_at(s: f32) -> Vec<f32> {
            vec![s, (1.0 - s * s).sqrt(), 0.0]
        }

        fn admit(store: &TierStore, input: &str, importance: f64, age_hours: i64, sim: f32) {
            let mut record = make_record(input, importance, age_hours, Some(vector_at(sim)));
            record.id = input.to_string();
            store.admit(record, None, false);
        }

        #[test]
        fn test_similarity_tie_broken_by_importance() {
            let store = TierStore::new();
            // Similarities land in the same 0.1 band; importance differs by
            // far more than the band width.
            admit(&store, "more similar", 0.2, 0, 0.98);
            admit(&store, "more important", 0.9, 0, 0.92);

            let result =
                retrieval::search(&store, &FixedEmbedder, "query", &RetrieveOptions::default())
                    .unwrap();
            assert_eq!(result.memories[0].id, "more important");
            assert_eq!(result.memories[1].id, "more similar");
        }

        #[test]
        fn test_clear_similarity_gap_wins_over_importance() {
            let store = TierStore::new();
            admit(&store, "close match", 0.1, 0, 0.95);
            admit(&store, "far match", 0.9, 0, 0.45);

            let result =
                retrieval::search(&store, &FixedEmbedder, "query", &RetrieveOptions::default())
                    .unwrap();
            assert_eq!(result.memories[0].id, "close match");
        }

        #[test]
        fn test_full_tie_broken_by_recency() {
            let store = TierStore::new();
            admit(&store, "older", 0.5, 10, 0.91);
            admit(&store, "newer", 0.5, 1, 0.93);

            let result =
                retrieval::search(&store, &FixedEmbedder, "query", &RetrieveOptions::default())
                    .unwrap();
            assert_eq!(result.memories[0].id, "newer");
        }

        #[test]
        fn test_records_without_embedding_are_skipped() {
            let store = TierStore::new();
            store.admit(make_record("no embedding", 0.9, 0, None), None, false);
            admit(&store, "embedded", 0.5, 0, 0.9);

            let result =
                retrieval::search(&store, &FixedEmbedder, "query", &RetrieveOptions::default())
                    .unwrap();
            assert_eq!(result.total_found, 1);
            assert_eq!(result.memories[0].id, "embedded");
        }

        #[test]
        fn test_threshold_and_truncation() {
            let store = TierStore::new();
            for i in 0..5 {
                admit(&store, &format!("hit {i}"), 0.5, 0, 0.9);
            }
            admit(&store, "miss", 0.5, 0, 0.1);

            let options = RetrieveOptions {
                max_results: 2,
                similarity_threshold: 0.5,
                ..Default::default()
            };
            let result = retrieval::search(&store, &FixedEmbedder, "query", &options).unwrap();
            assert_eq!(result.total_found, 5);
            assert_eq!(result.memories.len(), 2);
        }

        #[test]
        fn test_time_range_bounds_are_inclusive() {
            let store = TierStore::new();
            admit(&store, "ancient", 0.5, 48, 0.9);
            admit(&store, "recent", 0.5, 1, 0.9);

            let options = RetrieveOptions {
                time_range: Some(TimeRange {
                    start: Some(Utc::now() - Duration::hours(2)),
                    end: None,
                }),
                ..Default::default()
            };
            let result = retrieval::search(&store, &FixedEmbedder, "query", &options).unwrap();
            assert_eq!(result.total_found, 1);
            assert_eq!(result.memories[0].id, "recent");
        }

        #[test]
        fn test_long_term_hits_update_access_bookkeeping() {
            let store = TierStore::new();
            admit(&store, "promoted", 0.9, 0, 0.95);
            store.promote("promoted", Utc::now());

            let options = RetrieveOptions {
                tiers: vec![Tier::LongTerm],
                ..Default::default()
            };
            retrieval::search(&store, &FixedEmbedder, "query", &options).unwrap();
            retrieval::search(&store, &FixedEmbedder, "query", &options).unwrap();

            let entry = store.long_term_entry("promoted").unwrap();
            assert_eq!(entry.access_count, 2);
            assert!(entry.last_accessed.is_some());
        }

        #[test]
        fn test_zero_deadline_returns_timed_out_partial() {
            let store = TierStore::new();
            admit(&store, "hit", 0.5, 0, 0.9);

            let options = RetrieveOptions {
                timeout: Some(std::time::Duration::ZERO),
                ..Default::default()
            };
            let result = retrieval::search(&store, &FixedEmbedder, "query", &options).unwrap();
            assert!(result.timed_out);
            assert!(result.memories.is_empty());
        }

        #[test]
        fn test_include_context_false_strips_context() {
            let store = TierStore::new();
            admit(&store, "hit", 0.5, 0, 0.9);

            let options = RetrieveOptions {
                include_context: false,
                ..Default::default()
            };
            let result = retrieval::search(&store, &FixedEmbedder, "query", &options).unwrap();
            assert!(result.memories[0].context.is_none());
        }
    }
}
