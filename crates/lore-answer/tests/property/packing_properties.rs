//! Packing honors the budget and only ever drops the lowest-ranked tail.

use proptest::prelude::*;

use lore_answer::pack_evidence;
use lore_core::models::{EvidenceItem, EvidenceSource};

fn arb_items() -> impl Strategy<Value = Vec<EvidenceItem>> {
    prop::collection::vec("[a-z ]{1,40}", 0..20).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| EvidenceItem {
                source: EvidenceSource::Message {
                    message_ordinal: i as u32,
                },
                text,
                score: 1.0,
                timestamp: None,
            })
            .collect()
    })
}

fn ordinal(item: &EvidenceItem) -> u32 {
    match item.source {
        EvidenceSource::Message { message_ordinal } => message_ordinal,
        EvidenceSource::Knowledge { semantic_ref_ordinal, .. } => semantic_ref_ordinal,
    }
}

proptest! {
    #[test]
    fn every_chunk_fits_the_budget(
        items in arb_items(),
        budget in 1usize..80,
        chunking in any::<bool>(),
        max_chunks in 1usize..6,
    ) {
        let packed = pack_evidence(items, budget, chunking, max_chunks);
        for chunk in &packed.chunks {
            prop_assert!(!chunk.is_empty());
            prop_assert!(chunk.iter().map(EvidenceItem::char_len).sum::<usize>() <= budget);
        }
        let limit = if chunking { max_chunks } else { 1 };
        prop_assert!(packed.chunks.len() <= limit);
    }

    #[test]
    fn kept_items_are_a_rank_prefix(
        items in arb_items(),
        budget in 1usize..80,
        chunking in any::<bool>(),
        max_chunks in 1usize..6,
    ) {
        let total = items.len();
        let packed = pack_evidence(items, budget, chunking, max_chunks);
        let kept: Vec<u32> = packed.chunks.iter().flatten().map(ordinal).collect();
        let expected: Vec<u32> = (0..kept.len() as u32).collect();
        prop_assert_eq!(kept.len() + packed.dropped, total);
        prop_assert_eq!(kept, expected);
    }
}
