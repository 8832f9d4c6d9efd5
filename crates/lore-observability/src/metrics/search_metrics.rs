//! Executor counters: passes, relaxations, per-select outcomes, translation.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct SearchMetrics {
    queries: AtomicU64,
    passes: AtomicU64,
    relaxations: AtomicU64,
    relaxations_declined: AtomicU64,
    select_expressions: AtomicU64,
    select_matches: AtomicU64,
    execution_errors: AtomicU64,
    translation_failures: AtomicU64,
    translation_cache_hits: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchMetricsSnapshot {
    pub queries: u64,
    pub passes: u64,
    pub relaxations: u64,
    pub relaxations_declined: u64,
    pub select_expressions: u64,
    pub select_matches: u64,
    pub execution_errors: u64,
    pub translation_failures: u64,
    pub translation_cache_hits: u64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    /// One executor pass over `expressions` select expressions, of which
    /// `matched` counted.
    pub fn record_pass(&self, expressions: u64, matched: u64) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.select_expressions.fetch_add(expressions, Ordering::Relaxed);
        self.select_matches.fetch_add(matched, Ordering::Relaxed);
    }

    pub fn record_relaxation(&self, consented: bool) {
        if consented {
            self.relaxations.fetch_add(1, Ordering::Relaxed);
        } else {
            self.relaxations_declined.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_execution_error(&self) {
        self.execution_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation_failure(&self) {
        self.translation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation_cache_hit(&self) {
        self.translation_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of select expressions that matched.
    pub fn match_rate(&self) -> f64 {
        let total = self.select_expressions.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.select_matches.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn snapshot(&self) -> SearchMetricsSnapshot {
        SearchMetricsSnapshot {
            queries: self.queries.load(Ordering::Relaxed),
            passes: self.passes.load(Ordering::Relaxed),
            relaxations: self.relaxations.load(Ordering::Relaxed),
            relaxations_declined: self.relaxations_declined.load(Ordering::Relaxed),
            select_expressions: self.select_expressions.load(Ordering::Relaxed),
            select_matches: self.select_matches.load(Ordering::Relaxed),
            execution_errors: self.execution_errors.load(Ordering::Relaxed),
            translation_failures: self.translation_failures.load(Ordering::Relaxed),
            translation_cache_hits: self.translation_cache_hits.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.queries,
            &self.passes,
            &self.relaxations,
            &self.relaxations_declined,
            &self.select_expressions,
            &self.select_matches,
            &self.execution_errors,
            &self.translation_failures,
            &self.translation_cache_hits,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
