//! Answer synthesis: evidence selection, fallback, chunking, streaming.

use std::sync::{Arc, Mutex};

use lore_core::models::{
    AnswerChunk, AnswerKind, ConversationSearchResult, EvidenceSource, SearchOptions,
};
use lore_core::query::SearchTermGroup;
use lore_core::traits::IConversationIndex;
use lore_core::LoreError;
use lore_answer::{AnswerOptions, AnswerSynthesizer};
use lore_observability::AnswerMetrics;
use test_fixtures::builders::{alice_and_bob_index, term};
use test_fixtures::{FixtureIndex, ScriptedGenerator};

const QUESTION: &str = "what did bob buy?";

async fn search(index: &FixtureIndex, text: &str) -> ConversationSearchResult {
    let group = SearchTermGroup::or([term(text)]);
    let options = SearchOptions::default();
    ConversationSearchResult {
        raw_query: Some(text.to_string()),
        knowledge_matches: index.search_knowledge(&group, None, &options).await.unwrap(),
        message_matches: index.search_messages(&group, None, &options).await.unwrap(),
    }
}

fn options() -> AnswerOptions {
    AnswerOptions {
        include_messages: true,
        fast_stop: false,
        fallback: true,
        chunking: true,
        max_chunks: 8,
        max_chars_in_budget: 4_096,
        rag_threshold: 0.1,
    }
}

fn collect() -> (Arc<Mutex<Vec<AnswerChunk>>>, impl FnMut(AnswerChunk) + Send) {
    let chunks = Arc::new(Mutex::new(Vec::new()));
    let sink = chunks.clone();
    (chunks, move |chunk| sink.lock().unwrap().push(chunk))
}

fn ignore(_: AnswerChunk) {}

// ── Evidence selection ────────────────────────────────────────────────────

#[tokio::test]
async fn fast_stop_excludes_messages_when_knowledge_matched() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    assert!(!result.message_matches.is_empty());
    let generator = ScriptedGenerator::answering("A bike.");
    let fast = AnswerOptions {
        fast_stop: true,
        ..options()
    };

    let answer = AnswerSynthesizer::new(&index, &generator, fast)
        .answer(QUESTION, &[result], &mut ignore)
        .await
        .unwrap();

    let requests = generator.requests();
    assert!(requests[0].evidence.iter().all(|e| !e.is_message()));
    assert!(answer.reports[0].messages_skipped);
    assert_eq!(answer.reports[0].message_items, 0);
}

#[tokio::test]
async fn without_fast_stop_messages_are_evidence_too() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    let generator = ScriptedGenerator::answering("A bike.");

    AnswerSynthesizer::new(&index, &generator, options())
        .answer(QUESTION, &[result], &mut ignore)
        .await
        .unwrap();

    let evidence = &generator.requests()[0].evidence;
    assert!(evidence.iter().any(|e| e.is_message()));
    assert!(evidence.iter().any(|e| !e.is_message()));
    // The message scored highest (two leaves matched in it).
    assert_eq!(evidence[0].source, EvidenceSource::Message { message_ordinal: 1 });
}

#[tokio::test]
async fn excluded_messages_leave_knowledge_only() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    let generator = ScriptedGenerator::answering("A bike.");
    let knowledge_only = AnswerOptions {
        include_messages: false,
        ..options()
    };

    let answer = AnswerSynthesizer::new(&index, &generator, knowledge_only)
        .answer(QUESTION, &[result], &mut ignore)
        .await
        .unwrap();
    assert!(generator.requests()[0].evidence.iter().all(|e| !e.is_message()));
    assert_eq!(answer.reports[0].knowledge_items, 2);
}

// ── Fallback ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_result_falls_back_to_similarity_and_says_so() {
    let index = alice_and_bob_index();
    let mut empty = search(&index, "zebra").await;
    empty.raw_query = Some("bike for spring".into());
    let generator = ScriptedGenerator::echoing();

    let answer = AnswerSynthesizer::new(&index, &generator, options())
        .answer(QUESTION, &[empty], &mut ignore)
        .await
        .unwrap();

    assert!(answer.used_fallback());
    assert_eq!(answer.kind, AnswerKind::Answered);
    assert_eq!(answer.text, "Bob bought a bike for the spring.");
    assert_eq!(index.rag_searches(), 1);
}

#[tokio::test]
async fn fallback_disabled_means_no_answer_without_generation() {
    let index = alice_and_bob_index();
    let empty = search(&index, "zebra").await;
    let generator = ScriptedGenerator::answering("should not happen");
    let strict = AnswerOptions {
        fallback: false,
        ..options()
    };

    let answer = AnswerSynthesizer::new(&index, &generator, strict)
        .answer(QUESTION, &[empty], &mut ignore)
        .await
        .unwrap();

    assert_eq!(answer.kind, AnswerKind::NoAnswer);
    assert!(!answer.used_fallback());
    assert_eq!(generator.calls(), 0);
    assert_eq!(index.rag_searches(), 0);
}

#[tokio::test]
async fn fallback_without_similar_messages_reports_why() {
    let index = alice_and_bob_index();
    let empty = search(&index, "zebra").await;
    let generator = ScriptedGenerator::answering("unused");

    let answer = AnswerSynthesizer::new(&index, &generator, options())
        .answer(QUESTION, &[empty], &mut ignore)
        .await
        .unwrap();
    assert_eq!(answer.kind, AnswerKind::NoAnswer);
    assert_eq!(answer.why_no_answer.as_deref(), Some("no similar messages"));
    assert!(!answer.reports[0].used_fallback);
}

// ── Streaming and chunking ────────────────────────────────────────────────

#[tokio::test]
async fn every_partial_chunk_reaches_the_caller_in_order() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    let generator = ScriptedGenerator::answering("Bob bought a bike.").with_chunk_size(3);
    let (chunks, mut sink) = collect();

    let answer = AnswerSynthesizer::new(&index, &generator, options())
        .answer(QUESTION, &[result], &mut sink)
        .await
        .unwrap();

    let chunks = chunks.lock().unwrap();
    let streamed: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(streamed, answer.text);
    assert_eq!(chunks.len(), 6);
    assert!(chunks.iter().all(|c| c.result_index == 0 && c.chunk_index == 0));
}

#[tokio::test]
async fn over_budget_evidence_spreads_across_chunks_and_merges() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    let generator =
        ScriptedGenerator::answering_per_chunk(&["A bike.", "Bob is a person.", "a bike."]);
    let small = AnswerOptions {
        max_chars_in_budget: 14,
        ..options()
    };

    let answer = AnswerSynthesizer::new(&index, &generator, small)
        .answer(QUESTION, &[result], &mut ignore)
        .await
        .unwrap();

    let requests = generator.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.chunk_count == 3));
    assert!(requests
        .iter()
        .all(|r| r.evidence.iter().map(|e| e.char_len()).sum::<usize>() <= 14));
    assert_eq!(answer.text, "A bike.\n\nBob is a person.");
    assert_eq!(answer.reports[0].chunks_generated, 3);
}

#[tokio::test]
async fn budget_drops_lowest_ranked_evidence_never_the_question() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    let generator = ScriptedGenerator::answering("A bike.");
    let tight = AnswerOptions {
        max_chars_in_budget: 14,
        chunking: false,
        ..options()
    };

    let answer = AnswerSynthesizer::new(&index, &generator, tight)
        .answer(QUESTION, &[result], &mut ignore)
        .await
        .unwrap();

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].question, QUESTION);
    assert_eq!(requests[0].evidence.len(), 1);
    assert!(requests[0].evidence[0].is_message());
    assert_eq!(answer.reports[0].dropped_items, 2);
}

#[tokio::test]
async fn fast_stop_ends_after_first_answered_result() {
    let index = alice_and_bob_index();
    let results = [search(&index, "bob").await, search(&index, "alice").await];
    let generator = ScriptedGenerator::answering("Found it.");
    let fast = AnswerOptions {
        fast_stop: true,
        ..options()
    };

    let answer = AnswerSynthesizer::new(&index, &generator, fast)
        .answer(QUESTION, &results, &mut ignore)
        .await
        .unwrap();
    assert_eq!(generator.calls(), 1);
    assert_eq!(answer.reports.len(), 1);
}

#[tokio::test]
async fn answers_across_results_are_merged_without_duplicates() {
    let index = alice_and_bob_index();
    let results = [search(&index, "bob").await, search(&index, "alice").await];
    let generator = ScriptedGenerator::answering("Same answer.");

    let answer = AnswerSynthesizer::new(&index, &generator, options())
        .answer(QUESTION, &results, &mut ignore)
        .await
        .unwrap();
    assert_eq!(generator.calls(), 2);
    assert_eq!(answer.text, "Same answer.");
    assert_eq!(answer.reports.len(), 2);
}

// ── Failures ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn generation_failure_is_a_failed_result() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    let generator = ScriptedGenerator::failing("model overloaded");
    let metrics = Arc::new(AnswerMetrics::default());

    let err = AnswerSynthesizer::new(&index, &generator, options())
        .with_metrics(metrics.clone())
        .answer(QUESTION, &[result], &mut ignore)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoreError::GenerationFailure { ref reason } if reason == "model overloaded"
    ));
    assert_eq!(metrics.snapshot().generation_failures, 1);
}

#[tokio::test]
async fn no_answer_responses_carry_their_reason() {
    let index = alice_and_bob_index();
    let result = search(&index, "bob").await;
    let generator = ScriptedGenerator::no_answer("evidence is about something else");

    let answer = AnswerSynthesizer::new(&index, &generator, options())
        .answer(QUESTION, &[result], &mut ignore)
        .await
        .unwrap();
    assert_eq!(answer.kind, AnswerKind::NoAnswer);
    assert_eq!(answer.why_no_answer.as_deref(), Some("evidence is about something else"));
}
