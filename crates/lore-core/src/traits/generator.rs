use crate::errors::LoreResult;
use crate::models::{AnswerRequest, AnswerResponse};

/// Answer generation over a bounded evidence chunk.
#[allow(async_fn_in_trait)]
pub trait IAnswerGenerator: Send + Sync {
    /// Generate an answer, invoking `on_chunk` with each partial response
    /// chunk as it arrives.
    async fn generate(
        &self,
        request: &AnswerRequest,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> LoreResult<AnswerResponse>;
}
