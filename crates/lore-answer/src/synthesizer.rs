//! AnswerSynthesizer: evidence → chunked generation → merged answer.

use std::sync::Arc;

use tracing::{debug, info, Instrument};

use lore_core::models::{
    AnswerChunk, AnswerKind, AnswerRequest, ConversationSearchResult, LanguageSearchOutcome,
    RagOptions, ResultAnswerReport, SynthesizedAnswer,
};
use lore_core::traits::{IAnswerGenerator, IConversationIndex};
use lore_core::LoreResult;
use lore_observability::AnswerMetrics;

use crate::evidence;
use crate::options::AnswerOptions;
use crate::packing::pack_evidence;

pub struct AnswerSynthesizer<'a, I, G> {
    index: &'a I,
    generator: &'a G,
    options: AnswerOptions,
    metrics: Option<Arc<AnswerMetrics>>,
}

/// What the generator produced for one result.
#[derive(Default)]
struct ResultAnswers {
    answers: Vec<String>,
    why_no_answer: Vec<String>,
    stop: bool,
}

impl<'a, I, G> AnswerSynthesizer<'a, I, G>
where
    I: IConversationIndex,
    G: IAnswerGenerator,
{
    pub fn new(index: &'a I, generator: &'a G, options: AnswerOptions) -> Self {
        Self {
            index,
            generator,
            options,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AnswerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn options(&self) -> &AnswerOptions {
        &self.options
    }

    /// Answer from the final pass of a language search.
    pub async fn answer_outcome(
        &self,
        outcome: &LanguageSearchOutcome,
        on_chunk: &mut (dyn FnMut(AnswerChunk) + Send),
    ) -> LoreResult<SynthesizedAnswer> {
        let results: Vec<ConversationSearchResult> =
            outcome.results.iter().map(|r| r.result.clone()).collect();
        self.answer(&outcome.query_text, &results, on_chunk).await
    }

    /// Generate over each result in order and merge the answers. Every
    /// partial response is forwarded to `on_chunk`. A generation failure
    /// fails the whole call.
    pub async fn answer(
        &self,
        question: &str,
        results: &[ConversationSearchResult],
        on_chunk: &mut (dyn FnMut(AnswerChunk) + Send),
    ) -> LoreResult<SynthesizedAnswer> {
        let mut reports = Vec::with_capacity(results.len());
        let mut answers = Vec::new();
        let mut why_no_answer = Vec::new();

        for (result_index, result) in results.iter().enumerate() {
            let mut report = ResultAnswerReport {
                result_index,
                ..ResultAnswerReport::default()
            };
            let produced = self
                .answer_result(question, result_index, result, &mut report, on_chunk)
                .instrument(lore_observability::answer_span!(result_index))
                .await?;
            reports.push(report);
            answers.extend(produced.answers);
            why_no_answer.extend(produced.why_no_answer);
            if produced.stop {
                debug!(result_index, "fast stop");
                break;
            }
        }

        let answers = dedup_in_order(answers);
        if answers.is_empty() {
            let why = if why_no_answer.is_empty() {
                "no matching evidence".to_string()
            } else {
                dedup_in_order(why_no_answer).join("; ")
            };
            return Ok(SynthesizedAnswer {
                kind: AnswerKind::NoAnswer,
                text: String::new(),
                why_no_answer: Some(why),
                reports,
            });
        }
        Ok(SynthesizedAnswer {
            kind: AnswerKind::Answered,
            text: answers.join("\n\n"),
            why_no_answer: None,
            reports,
        })
    }

    async fn answer_result(
        &self,
        question: &str,
        result_index: usize,
        result: &ConversationSearchResult,
        report: &mut ResultAnswerReport,
        on_chunk: &mut (dyn FnMut(AnswerChunk) + Send),
    ) -> LoreResult<ResultAnswers> {
        let mut produced = ResultAnswers::default();

        let fallback;
        let (result, include_messages) = if result.has_matches() {
            (result, self.options.include_messages)
        } else if self.options.fallback {
            let text = result.raw_query.as_deref().unwrap_or(question);
            let rag = RagOptions {
                threshold_score: self.options.rag_threshold,
                max_chars_in_budget: self.options.max_chars_in_budget,
            };
            match self.index.search_rag(text, &rag).await? {
                Some(message_matches) => {
                    info!(
                        result_index,
                        hits = message_matches.len(),
                        "similarity fallback substituted"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_fallback();
                    }
                    report.used_fallback = true;
                    fallback = ConversationSearchResult {
                        raw_query: result.raw_query.clone(),
                        message_matches,
                        ..ConversationSearchResult::default()
                    };
                    // Fallback evidence is message text by construction.
                    (&fallback, true)
                }
                None => {
                    produced.why_no_answer.push("no similar messages".to_string());
                    return Ok(produced);
                }
            }
        } else {
            produced.why_no_answer.push("no matching evidence".to_string());
            return Ok(produced);
        };

        let skip_messages =
            self.options.fast_stop && !result.knowledge_matches.is_empty();
        let mut gathered =
            evidence::gather(self.index, result, include_messages, skip_messages).await?;
        report.knowledge_items = gathered.knowledge_items;
        report.message_items = gathered.message_items;
        report.messages_skipped = gathered.messages_skipped;

        evidence::rank(&mut gathered.items);
        let packed = pack_evidence(
            gathered.items,
            self.options.max_chars_in_budget,
            self.options.chunking,
            self.options.max_chunks,
        );
        report.evidence_chars = packed.total_chars();
        report.dropped_items = packed.dropped;
        if let Some(metrics) = &self.metrics {
            metrics.record_dropped(packed.dropped as u64);
        }

        let chunk_count = packed.chunks.len();
        for (chunk_index, chunk) in packed.chunks.into_iter().enumerate() {
            let request = AnswerRequest {
                question: question.to_string(),
                evidence: chunk,
                chunk_index,
                chunk_count,
            };
            let metrics = self.metrics.as_deref();
            let mut forward = |text: &str| {
                if let Some(metrics) = metrics {
                    metrics.record_chunk();
                }
                on_chunk(AnswerChunk {
                    result_index,
                    chunk_index,
                    text: text.to_string(),
                });
            };
            let response = self.generator.generate(&request, &mut forward).await;
            if let Some(metrics) = &self.metrics {
                metrics.record_generation(response.is_ok());
            }
            let response = response?;
            report.chunks_generated += 1;

            match response.kind {
                AnswerKind::Answered => {
                    if let Some(answer) = response.answer.filter(|a| !a.trim().is_empty()) {
                        produced.answers.push(answer);
                        if self.options.fast_stop {
                            produced.stop = true;
                            break;
                        }
                    }
                }
                AnswerKind::NoAnswer => {
                    if let Some(why) = response.why_no_answer {
                        produced.why_no_answer.push(why);
                    }
                }
            }
        }
        Ok(produced)
    }
}

/// Drop answers that repeat an earlier one (ignoring case and surrounding
/// whitespace), keeping first occurrences in order.
fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let key = item.trim().to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(item.trim().to_string());
        }
    }
    out
}
