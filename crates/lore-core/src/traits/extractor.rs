use crate::errors::LoreResult;
use crate::models::KnowledgeResponse;

/// Knowledge extraction from message text (typically model-backed).
#[allow(async_fn_in_trait)]
pub trait IKnowledgeExtractor: Send + Sync {
    /// Identifier of the model variant behind this extractor.
    fn model_name(&self) -> &str;

    async fn extract(&self, text: &str) -> LoreResult<KnowledgeResponse>;
}
