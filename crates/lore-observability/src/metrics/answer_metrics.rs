//! Answer synthesis counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct AnswerMetrics {
    generations: AtomicU64,
    generation_failures: AtomicU64,
    fallbacks: AtomicU64,
    chunks_streamed: AtomicU64,
    evidence_dropped: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerMetricsSnapshot {
    pub generations: u64,
    pub generation_failures: u64,
    pub fallbacks: u64,
    pub chunks_streamed: u64,
    pub evidence_dropped: u64,
}

impl AnswerMetrics {
    pub fn record_generation(&self, ok: bool) {
        self.generations.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.generation_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk(&self) {
        self.chunks_streamed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, items: u64) {
        self.evidence_dropped.fetch_add(items, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AnswerMetricsSnapshot {
        AnswerMetricsSnapshot {
            generations: self.generations.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            chunks_streamed: self.chunks_streamed.load(Ordering::Relaxed),
            evidence_dropped: self.evidence_dropped.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.generations.store(0, Ordering::Relaxed);
        self.generation_failures.store(0, Ordering::Relaxed);
        self.fallbacks.store(0, Ordering::Relaxed);
        self.chunks_streamed.store(0, Ordering::Relaxed);
        self.evidence_dropped.store(0, Ordering::Relaxed);
    }
}
