//! Turning a search result into ranked evidence items.

use lore_core::models::{
    ConversationSearchResult, EvidenceItem, EvidenceSource, KnowledgeMatches, MessageMatches,
};
use lore_core::traits::IConversationIndex;
use lore_core::LoreResult;

pub fn knowledge_evidence(matches: &KnowledgeMatches) -> Vec<EvidenceItem> {
    matches
        .matches
        .iter()
        .map(|m| EvidenceItem {
            source: EvidenceSource::Knowledge {
                knowledge_type: m.semantic_ref.knowledge.knowledge_type(),
                semantic_ref_ordinal: m.semantic_ref.semantic_ref_ordinal,
            },
            text: m.semantic_ref.knowledge.to_evidence_text(),
            score: m.score,
            timestamp: None,
        })
        .collect()
}

/// Message text for each match, in match order. Ordinals the index no
/// longer knows are skipped.
pub async fn message_evidence<I: IConversationIndex>(
    index: &I,
    matches: &MessageMatches,
) -> LoreResult<Vec<EvidenceItem>> {
    let messages = index.get_messages(&matches.ordinals()).await?;
    Ok(matches
        .matches
        .iter()
        .filter_map(|m| {
            let message = messages.iter().find(|msg| msg.ordinal == m.message_ordinal)?;
            Some(EvidenceItem {
                source: EvidenceSource::Message {
                    message_ordinal: m.message_ordinal,
                },
                text: message.text(),
                score: m.score,
                timestamp: message.timestamp,
            })
        })
        .collect())
}

/// Evidence drawn from one result.
#[derive(Debug, Default)]
pub struct GatheredEvidence {
    pub items: Vec<EvidenceItem>,
    pub knowledge_items: usize,
    pub message_items: usize,
    pub messages_skipped: bool,
}

/// Knowledge first, then messages; message evidence is skipped when
/// `skip_messages` is set.
pub async fn gather<I: IConversationIndex>(
    index: &I,
    result: &ConversationSearchResult,
    include_messages: bool,
    skip_messages: bool,
) -> LoreResult<GatheredEvidence> {
    let mut items = knowledge_evidence(&result.knowledge_matches);
    let knowledge_items = items.len();
    let messages_skipped = skip_messages && !result.message_matches.is_empty();
    let mut message_items = 0;
    if include_messages && !skip_messages && !result.message_matches.is_empty() {
        let messages = message_evidence(index, &result.message_matches).await?;
        message_items = messages.len();
        items.extend(messages);
    }
    Ok(GatheredEvidence {
        items,
        knowledge_items,
        message_items,
        messages_skipped,
    })
}

/// Stable sort by score, best first. Equal scores keep gather order, so
/// knowledge outranks messages on ties.
pub fn rank(items: &mut [EvidenceItem]) {
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
}
