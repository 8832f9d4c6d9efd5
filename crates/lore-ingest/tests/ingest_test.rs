//! Knowledge ingestion: failure recording, ordering, concurrency bound.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lore_core::errors::LoreErrorCode;
use lore_core::models::{ConcreteEntity, Knowledge, KnowledgeResponse, Message};
use lore_core::traits::{Cancellable, CancellationToken, IKnowledgeExtractor};
use lore_core::{LoreError, LoreResult};
use lore_ingest::{index_messages, ExtractorRegistry, IngestOptions, KnowledgeIndexer};
use lore_observability::IngestMetrics;
use test_fixtures::{FixtureIndex, ScriptedExtractor};

fn conversation(texts: &[&str]) -> (FixtureIndex, Vec<Message>) {
    let index = texts
        .iter()
        .fold(FixtureIndex::new("ingest"), |index, text| index.with_message(text));
    let messages = texts
        .iter()
        .enumerate()
        .map(|(i, text)| Message::new(i as u32, *text))
        .collect();
    (index, messages)
}

fn options(batch_size: usize, concurrency: usize) -> IngestOptions {
    IngestOptions {
        batch_size,
        concurrency,
    }
}

/// Sleeps longer for earlier messages and tracks how many calls overlap.
struct SlowExtractor {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowExtractor {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl IKnowledgeExtractor for SlowExtractor {
    fn model_name(&self) -> &str {
        "slow"
    }

    async fn extract(&self, text: &str) -> LoreResult<KnowledgeResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let delay = 40u64.saturating_sub(text.len() as u64 * 5);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(KnowledgeResponse {
            entities: vec![ConcreteEntity::new(text, &["marker"])],
            ..KnowledgeResponse::default()
        })
    }
}

// ── Failures ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn extraction_failures_are_recorded_and_skipped() {
    let (index, messages) = conversation(&["Alice arrived", "FAIL here", "Bob left"]);
    let extractor = ScriptedExtractor::new("scripted").failing_on("FAIL");

    let report = index_messages(&index, &extractor, &messages, &options(2, 2))
        .await
        .unwrap();

    assert_eq!(report.indexed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].message_ordinal, 1);
    assert!(!report.is_complete());
    assert_eq!(extractor.calls(), 3);

    let names: Vec<String> = index
        .semantic_refs()
        .into_iter()
        .filter_map(|r| match r.knowledge {
            Knowledge::Entity(e) => Some(e.name),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn unknown_message_is_a_recorded_failure() {
    let (index, _) = conversation(&["Alice arrived"]);
    let stray = vec![Message::new(5, "Zed wandered in")];
    let extractor = ScriptedExtractor::new("scripted");

    let report = index_messages(&index, &extractor, &stray, &options(4, 1))
        .await
        .unwrap();
    assert_eq!(report.indexed, 0);
    assert_eq!(report.failures[0].message_ordinal, 5);
}

#[tokio::test]
async fn cancellation_stops_before_the_next_batch() {
    let (index, messages) = conversation(&["Alice", "Bob"]);
    let extractor = ScriptedExtractor::new("scripted");
    let token = CancellationToken::new();
    token.cancel();

    let err = KnowledgeIndexer::new(&index, &extractor, options(1, 1))
        .with_cancellation(token)
        .run(&messages)
        .await
        .unwrap_err();
    assert!(matches!(err, LoreError::Cancelled));
    assert_eq!(extractor.calls(), 0);
}

// ── Ordering and concurrency ──────────────────────────────────────────────

#[tokio::test]
async fn knowledge_is_added_in_chunk_order() {
    let mut two_chunks = Message::new(0, "a");
    two_chunks.text_chunks.push("bbbb".into());
    let index = FixtureIndex::new("ingest").with_message("a").with_message("cc");
    let messages = vec![two_chunks, Message::new(1, "cc")];
    let extractor = SlowExtractor::new();

    let report = index_messages(&index, &extractor, &messages, &options(8, 3))
        .await
        .unwrap();
    assert_eq!(report.indexed, 3);

    let anchors: Vec<(u32, u32)> = index
        .semantic_refs()
        .iter()
        .map(|r| (r.range.start.message_ordinal, r.range.start.chunk_ordinal))
        .collect();
    assert_eq!(anchors, vec![(0, 0), (0, 1), (1, 0)]);
}

#[tokio::test]
async fn concurrency_is_bounded() {
    let texts: Vec<String> = (0..12).map(|i| format!("m{i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let (index, messages) = conversation(&refs);
    let extractor = SlowExtractor::new();
    let metrics = IngestMetrics::default();

    let report = KnowledgeIndexer::new(&index, &extractor, options(6, 2))
        .with_metrics(&metrics)
        .run(&messages)
        .await
        .unwrap();

    assert_eq!(report.indexed, 12);
    assert!(extractor.peak.load(Ordering::SeqCst) <= 2);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.batches, 2);
    assert_eq!(snapshot.chunks_indexed, 12);
}

// ── Registry ──────────────────────────────────────────────────────────────

#[test]
fn registry_resolves_named_and_default_variants() {
    let registry = ExtractorRegistry::new("small")
        .with("small", ScriptedExtractor::new("small-model"))
        .with("large", ScriptedExtractor::new("large-model"));

    assert_eq!(registry.resolve(None).unwrap().model_name(), "small-model");
    assert_eq!(registry.resolve(Some("large")).unwrap().model_name(), "large-model");
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["large", "small"]);

    let Err(err) = registry.resolve(Some("huge")) else {
        panic!("unregistered extractor resolved");
    };
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn registry_default_comes_from_config() {
    let registry: ExtractorRegistry<ScriptedExtractor> =
        ExtractorRegistry::from_config(&lore_core::config::IngestConfig::default());
    assert_eq!(registry.default_name(), "default");
    assert!(registry.is_empty());
    assert!(registry.resolve(None).is_err());
}
