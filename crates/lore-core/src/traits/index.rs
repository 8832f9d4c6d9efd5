use crate::errors::LoreResult;
use crate::models::{
    KnowledgeMatches, KnowledgeResponse, Message, MessageMatches, RagOptions, SearchOptions,
};
use crate::query::{DateRange, SearchTermGroup, WhenFilter};

/// The semantic index over one conversation: term lookups, similarity
/// search, and knowledge ingestion.
///
/// Every method is a potentially long-latency suspension point. A
/// cancelled or timed-out call must fail with an error, never return a
/// partial result.
#[allow(async_fn_in_trait)]
pub trait IConversationIndex: Send + Sync {
    /// Human-readable name of the conversation.
    fn name(&self) -> &str;

    /// Knowledge matches for a term group. Under `and`, a hit must satisfy
    /// every child; under `or`, any child.
    async fn search_knowledge(
        &self,
        group: &SearchTermGroup,
        when: Option<&WhenFilter>,
        options: &SearchOptions,
    ) -> LoreResult<KnowledgeMatches>;

    /// Messages matched by a term group, ranked by score.
    async fn search_messages(
        &self,
        group: &SearchTermGroup,
        when: Option<&WhenFilter>,
        options: &SearchOptions,
    ) -> LoreResult<MessageMatches>;

    /// Plain text-similarity search over raw message text.
    /// `None` when nothing clears the threshold.
    async fn search_rag(
        &self,
        text: &str,
        options: &RagOptions,
    ) -> LoreResult<Option<MessageMatches>>;

    /// First and last message timestamps, if any message is dated.
    async fn time_range(&self) -> LoreResult<Option<DateRange>>;

    /// Number of messages in the append-only sequence.
    async fn message_count(&self) -> LoreResult<u32>;

    /// Fetch messages by ordinal. Unknown ordinals are skipped.
    async fn get_messages(&self, ordinals: &[u32]) -> LoreResult<Vec<Message>>;

    /// Index knowledge extracted from one chunk of one message.
    async fn add_knowledge(
        &self,
        message_ordinal: u32,
        chunk_ordinal: u32,
        knowledge: &KnowledgeResponse,
    ) -> LoreResult<()>;
}
