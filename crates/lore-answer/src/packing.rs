//! Character-budget packing of ranked evidence.
//!
//! The budget bounds evidence text only; the question always travels with
//! every chunk. Items are taken in rank order; once one does not fit and no
//! further chunk may be opened, it and everything ranked below it are
//! dropped. An item longer than the whole budget is truncated to it.

use lore_core::models::EvidenceItem;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedEvidence {
    /// Non-empty chunks, each within budget, in rank order.
    pub chunks: Vec<Vec<EvidenceItem>>,
    /// Lowest-ranked items that did not fit.
    pub dropped: usize,
}

impl PackedEvidence {
    pub fn total_chars(&self) -> usize {
        self.chunks.iter().flatten().map(EvidenceItem::char_len).sum()
    }
}

/// Pack ranked evidence into at most `max_chunks` chunks (1 when `chunking`
/// is off) of at most `budget` characters each.
pub fn pack_evidence(
    ranked: Vec<EvidenceItem>,
    budget: usize,
    chunking: bool,
    max_chunks: usize,
) -> PackedEvidence {
    let max_chunks = if chunking { max_chunks.max(1) } else { 1 };
    let mut packed = PackedEvidence::default();
    if budget == 0 {
        packed.dropped = ranked.len();
        return packed;
    }

    let total = ranked.len();
    let mut current: Vec<EvidenceItem> = Vec::new();
    let mut used = 0;
    for (taken, item) in ranked.into_iter().enumerate() {
        let item = truncate_to(item, budget);
        let len = item.char_len();
        if used + len > budget {
            if packed.chunks.len() + 1 >= max_chunks {
                packed.dropped = total - taken;
                break;
            }
            packed.chunks.push(std::mem::take(&mut current));
            used = 0;
        }
        used += len;
        current.push(item);
    }
    if !current.is_empty() {
        packed.chunks.push(current);
    }
    packed
}

fn truncate_to(mut item: EvidenceItem, budget: usize) -> EvidenceItem {
    if item.char_len() > budget {
        item.text = item.text.chars().take(budget).collect();
    }
    item
}
