//! Batched knowledge extraction with bounded concurrency.
//!
//! Extraction failures are recorded and the loop moves on; only systemic
//! errors (cancellation, no conversation) stop it.

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use lore_core::config::IngestConfig;
use lore_core::models::Message;
use lore_core::traits::{Cancellable, CancellationToken, IConversationIndex, IKnowledgeExtractor};
use lore_core::{LoreError, LoreResult};
use lore_observability::IngestMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Chunks per batch; the index sees one batch's knowledge at a time.
    pub batch_size: usize,
    /// Extraction calls in flight at once.
    pub concurrency: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for IngestOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            concurrency: config.concurrency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestFailure {
    pub message_ordinal: u32,
    pub chunk_ordinal: u32,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Chunks whose knowledge reached the index.
    pub indexed: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct KnowledgeIndexer<'a, I, E> {
    index: &'a I,
    extractor: &'a E,
    options: IngestOptions,
    metrics: Option<&'a IngestMetrics>,
    cancel: Option<CancellationToken>,
}

impl<'a, I, E> KnowledgeIndexer<'a, I, E>
where
    I: IConversationIndex,
    E: IKnowledgeExtractor,
{
    pub fn new(index: &'a I, extractor: &'a E, options: IngestOptions) -> Self {
        Self {
            index,
            extractor,
            options: IngestOptions {
                batch_size: options.batch_size.max(1),
                concurrency: options.concurrency.max(1),
            },
            metrics: None,
            cancel: None,
        }
    }

    pub fn with_metrics(mut self, metrics: &'a IngestMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Extract and index every chunk of `messages`. Knowledge is added in
    /// message/chunk order regardless of which extraction finished first.
    pub async fn run(&self, messages: &[Message]) -> LoreResult<IngestReport> {
        let chunks: Vec<(u32, u32, &str)> = messages
            .iter()
            .flat_map(|m| {
                m.text_chunks
                    .iter()
                    .enumerate()
                    .map(move |(c, text)| (m.ordinal, c as u32, text.as_str()))
            })
            .collect();

        let mut report = IngestReport::default();
        for (batch, items) in chunks.chunks(self.options.batch_size).enumerate() {
            if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                return Err(LoreError::Cancelled);
            }
            let span = lore_observability::ingest_span!(batch, items.len());
            let (indexed, failed) = self.run_batch(items, &mut report).instrument(span).await?;
            if let Some(metrics) = self.metrics {
                metrics.record_batch(indexed as u64, failed as u64);
            }
        }

        info!(
            model = self.extractor.model_name(),
            indexed = report.indexed,
            failed = report.failures.len(),
            "ingestion complete"
        );
        Ok(report)
    }

    async fn run_batch(
        &self,
        items: &[(u32, u32, &str)],
        report: &mut IngestReport,
    ) -> LoreResult<(usize, usize)> {
        let extracted: Vec<_> = stream::iter(items.iter().copied())
            .map(|(message_ordinal, chunk_ordinal, text)| async move {
                (message_ordinal, chunk_ordinal, self.extractor.extract(text).await)
            })
            .buffered(self.options.concurrency)
            .collect()
            .await;

        let (mut indexed, mut failed) = (0, 0);
        for (message_ordinal, chunk_ordinal, outcome) in extracted {
            let added = match outcome {
                Ok(knowledge) if knowledge.is_empty() => {
                    debug!(message_ordinal, chunk_ordinal, "nothing extracted");
                    Ok(())
                }
                Ok(knowledge) => {
                    self.index
                        .add_knowledge(message_ordinal, chunk_ordinal, &knowledge)
                        .await
                }
                Err(e) => Err(e),
            };
            match added {
                Ok(()) => indexed += 1,
                Err(e) if e.is_systemic() => return Err(e),
                Err(e) => {
                    warn!(message_ordinal, chunk_ordinal, error = %e, "chunk not indexed");
                    failed += 1;
                    report.failures.push(IngestFailure {
                        message_ordinal,
                        chunk_ordinal,
                        error: e.to_string(),
                    });
                }
            }
        }
        report.indexed += indexed;
        Ok((indexed, failed))
    }
}

/// Convenience wrapper for a one-off run without metrics or cancellation.
pub async fn index_messages<I, E>(
    index: &I,
    extractor: &E,
    messages: &[Message],
    options: &IngestOptions,
) -> LoreResult<IngestReport>
where
    I: IConversationIndex,
    E: IKnowledgeExtractor,
{
    KnowledgeIndexer::new(index, extractor, *options).run(messages).await
}
