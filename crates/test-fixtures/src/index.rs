//! FixtureIndex: an in-memory conversation index.
//!
//! Knowledge hits follow real term-group semantics: `and` needs every
//! child, `or` any child, `or_max` keeps only the hits that matched the
//! most leaves, and an empty group matches nothing. A hit's score is the
//! number of leaves it matched. Message hits are derived from knowledge
//! hits. Thread descriptions are ignored.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

use lore_core::models::{
    Knowledge, KnowledgeMatches, KnowledgeResponse, Message, MessageMatches, RagOptions,
    ScoredKnowledge, ScoredMessageOrdinal, SearchOptions, SemanticRef,
};
use lore_core::query::{
    property_names, BooleanOp, ComparisonOp, DateRange, PropertySearchTerm, SearchTerm,
    SearchTermGroup, Term, TextLocation, TextRange, WhenFilter,
};
use lore_core::traits::IConversationIndex;
use lore_core::{LoreError, LoreResult};

#[derive(Default)]
struct State {
    messages: Vec<Message>,
    refs: Vec<SemanticRef>,
}

pub struct FixtureIndex {
    name: String,
    state: RwLock<State>,
    failures: Mutex<Vec<(String, String)>>,
    delay: Option<Duration>,
    knowledge_searches: AtomicUsize,
    message_searches: AtomicUsize,
    rag_searches: AtomicUsize,
}

impl FixtureIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(State::default()),
            failures: Mutex::new(Vec::new()),
            delay: None,
            knowledge_searches: AtomicUsize::new(0),
            message_searches: AtomicUsize::new(0),
            rag_searches: AtomicUsize::new(0),
        }
    }

    // ── Builders ──────────────────────────────────────────────────────────

    pub fn with_message(mut self, text: &str) -> Self {
        self.append(text, None);
        self
    }

    pub fn with_dated_message(mut self, text: &str, timestamp: DateTime<Utc>) -> Self {
        self.append(text, Some(timestamp));
        self
    }

    /// Attach knowledge to an existing message (chunk 0).
    pub fn with_knowledge(mut self, message_ordinal: u32, knowledge: Knowledge) -> Self {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let ordinal = state.refs.len() as u32;
        state.refs.push(SemanticRef {
            semantic_ref_ordinal: ordinal,
            range: TextRange::message(message_ordinal),
            knowledge,
        });
        self
    }

    /// Any search whose group mentions `term` fails with an execution error.
    pub fn fail_on_term(self, term: &str, reason: &str) -> Self {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((term.to_ascii_lowercase(), reason.to_string()));
        self
    }

    /// Sleep before answering every search.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn append(&mut self, text: &str, timestamp: Option<DateTime<Utc>>) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let mut message = Message::new(state.messages.len() as u32, text);
        message.timestamp = timestamp;
        state.messages.push(message);
    }

    /// Append a fully built message; its ordinal is reassigned.
    pub fn push_message(&self, mut message: Message) -> u32 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let ordinal = state.messages.len() as u32;
        message.ordinal = ordinal;
        state.messages.push(message);
        ordinal
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn knowledge_searches(&self) -> usize {
        self.knowledge_searches.load(Ordering::SeqCst)
    }

    pub fn message_searches(&self) -> usize {
        self.message_searches.load(Ordering::SeqCst)
    }

    pub fn rag_searches(&self) -> usize {
        self.rag_searches.load(Ordering::SeqCst)
    }

    pub fn semantic_refs(&self) -> Vec<SemanticRef> {
        self.read().refs.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_failure(&self, group: &SearchTermGroup) -> LoreResult<()> {
        let failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        for term in group.all_search_terms() {
            let text = term.text.to_ascii_lowercase();
            if let Some((_, reason)) = failures.iter().find(|(t, _)| *t == text) {
                return Err(LoreError::execution(group.to_string(), reason.clone()));
            }
        }
        Ok(())
    }

    /// Scored knowledge hits, best first.
    fn score_refs(
        &self,
        group: &SearchTermGroup,
        when: Option<&WhenFilter>,
        exact: bool,
        check_type: bool,
    ) -> Vec<(SemanticRef, usize)> {
        let state = self.read();
        let mut scored: Vec<(SemanticRef, usize)> = state
            .refs
            .iter()
            .filter(|r| ref_in_scope(&state, r, when, check_type))
            .filter_map(|r| eval_group(group, &r.knowledge, exact).map(|n| (r.clone(), n)))
            .collect();
        if group.boolean_op == BooleanOp::OrMax {
            let best = scored.iter().map(|(_, n)| *n).max().unwrap_or(0);
            scored.retain(|(_, n)| *n == best);
        }
        scored.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then(a.0.semantic_ref_ordinal.cmp(&b.0.semantic_ref_ordinal))
        });
        scored
    }
}

impl IConversationIndex for FixtureIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_knowledge(
        &self,
        group: &SearchTermGroup,
        when: Option<&WhenFilter>,
        options: &SearchOptions,
    ) -> LoreResult<KnowledgeMatches> {
        self.pause().await;
        self.knowledge_searches.fetch_add(1, Ordering::SeqCst);
        self.check_failure(group)?;

        let mut scored = self.score_refs(group, when, options.exact_match, true);
        if let Some(threshold) = options.threshold_score {
            scored.retain(|(_, n)| *n as f32 >= threshold);
        }
        if let Some(max) = options.max_knowledge_matches {
            scored.truncate(max);
        }

        let mut term_matches: Vec<String> = Vec::new();
        for term in group.all_search_terms() {
            let hit = scored.iter().any(|(r, _)| {
                all_fields(&r.knowledge)
                    .iter()
                    .any(|f| term_hits(term, f, options.exact_match))
            });
            if hit && !term_matches.iter().any(|t| t.eq_ignore_ascii_case(&term.text)) {
                term_matches.push(term.text.clone());
            }
        }

        Ok(KnowledgeMatches {
            matches: scored
                .into_iter()
                .map(|(semantic_ref, n)| ScoredKnowledge {
                    semantic_ref,
                    score: n as f32,
                })
                .collect(),
            term_matches,
        })
    }

    async fn search_messages(
        &self,
        group: &SearchTermGroup,
        when: Option<&WhenFilter>,
        options: &SearchOptions,
    ) -> LoreResult<MessageMatches> {
        self.pause().await;
        self.message_searches.fetch_add(1, Ordering::SeqCst);
        self.check_failure(group)?;

        let mut per_message: BTreeMap<u32, usize> = BTreeMap::new();
        for (r, n) in self.score_refs(group, when, options.exact_match, false) {
            *per_message.entry(r.range.start.message_ordinal).or_default() += n;
        }
        let mut matches: Vec<ScoredMessageOrdinal> = per_message
            .into_iter()
            .map(|(message_ordinal, n)| ScoredMessageOrdinal {
                message_ordinal,
                score: n as f32,
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.message_ordinal.cmp(&b.message_ordinal))
        });
        if let Some(max) = options.max_message_matches {
            matches.truncate(max);
        }
        Ok(MessageMatches { matches })
    }

    async fn search_rag(
        &self,
        text: &str,
        options: &RagOptions,
    ) -> LoreResult<Option<MessageMatches>> {
        self.pause().await;
        self.rag_searches.fetch_add(1, Ordering::SeqCst);

        let query = words(text);
        if query.is_empty() {
            return Ok(None);
        }
        let state = self.read();
        let mut scored: Vec<(u32, f32, usize)> = state
            .messages
            .iter()
            .filter_map(|m| {
                let body = m.text();
                let present = words(&body);
                let overlap = query.iter().filter(|w| present.contains(w)).count();
                let score = overlap as f32 / query.len() as f32;
                (overlap > 0 && score >= options.threshold_score)
                    .then(|| (m.ordinal, score, body.chars().count()))
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut used = 0usize;
        let mut matches = Vec::new();
        for (message_ordinal, score, chars) in scored {
            if used + chars > options.max_chars_in_budget {
                break;
            }
            used += chars;
            matches.push(ScoredMessageOrdinal { message_ordinal, score });
        }
        Ok((!matches.is_empty()).then_some(MessageMatches { matches }))
    }

    async fn time_range(&self) -> LoreResult<Option<DateRange>> {
        let state = self.read();
        let mut stamps = state.messages.iter().filter_map(|m| m.timestamp);
        let Some(first) = stamps.next() else {
            return Ok(None);
        };
        let (start, end) = stamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));
        Ok(Some(DateRange::new(start, end)))
    }

    async fn message_count(&self) -> LoreResult<u32> {
        Ok(self.read().messages.len() as u32)
    }

    async fn get_messages(&self, ordinals: &[u32]) -> LoreResult<Vec<Message>> {
        let state = self.read();
        Ok(ordinals
            .iter()
            .filter_map(|o| state.messages.get(*o as usize).cloned())
            .collect())
    }

    async fn add_knowledge(
        &self,
        message_ordinal: u32,
        chunk_ordinal: u32,
        knowledge: &KnowledgeResponse,
    ) -> LoreResult<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if message_ordinal as usize >= state.messages.len() {
            return Err(LoreError::execution(
                format!("add_knowledge({message_ordinal})"),
                "unknown message ordinal",
            ));
        }
        for item in knowledge.clone().into_knowledge() {
            let ordinal = state.refs.len() as u32;
            state.refs.push(SemanticRef {
                semantic_ref_ordinal: ordinal,
                range: TextRange {
                    start: TextLocation::new(message_ordinal, chunk_ordinal),
                    end: None,
                },
                knowledge: item,
            });
        }
        Ok(())
    }
}

fn ref_in_scope(
    state: &State,
    r: &SemanticRef,
    when: Option<&WhenFilter>,
    check_type: bool,
) -> bool {
    let Some(when) = when else {
        return true;
    };
    if check_type {
        if let Some(kt) = when.knowledge_type {
            if r.knowledge.knowledge_type() != kt {
                return false;
            }
        }
    }
    let ordinal = r.range.start.message_ordinal;
    if !when.in_scope(ordinal) {
        return false;
    }
    let message = state.messages.get(ordinal as usize);
    if when.date_range.is_some() && !when.in_date_range(message.and_then(|m| m.timestamp)) {
        return false;
    }
    when.tags.is_none() || message.is_some_and(|m| when.has_tag(&m.tags))
}

/// Number of matched leaves, or `None` when the group does not match.
fn eval_group(group: &SearchTermGroup, knowledge: &Knowledge, exact: bool) -> Option<usize> {
    if group.is_empty() {
        return None;
    }
    let results: Vec<Option<usize>> = group
        .terms
        .iter()
        .map(|t| eval_term(t, knowledge, exact))
        .collect();
    match group.boolean_op {
        BooleanOp::And => results.iter().try_fold(0, |acc, r| r.map(|n| acc + n)),
        BooleanOp::Or | BooleanOp::OrMax => {
            let total: usize = results.iter().flatten().sum();
            results.iter().any(Option::is_some).then_some(total)
        }
    }
}

fn eval_term(term: &Term, knowledge: &Knowledge, exact: bool) -> Option<usize> {
    match term {
        Term::Search(t) => all_fields(knowledge)
            .iter()
            .any(|f| term_hits(t, f, exact))
            .then_some(1),
        Term::Property(p) => property_hits(p, knowledge, exact).then_some(1),
        Term::Group(g) => eval_group(g, knowledge, exact),
    }
}

fn term_hits(term: &SearchTerm, candidate: &str, exact: bool) -> bool {
    if exact {
        term.text.eq_ignore_ascii_case(candidate)
    } else {
        term.matches_text(candidate)
    }
}

fn property_hits(term: &PropertySearchTerm, knowledge: &Knowledge, exact: bool) -> bool {
    let fields = property_fields(knowledge, &term.property_name);
    let value = &term.property_value;
    match term.op() {
        ComparisonOp::Eq => fields.iter().any(|f| term_hits(value, f, exact)),
        ComparisonOp::Ne => {
            !fields.is_empty() && !fields.iter().any(|f| term_hits(value, f, exact))
        }
        op => fields.iter().any(|f| {
            let ordering = match (f.parse::<f64>(), value.text.parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b),
                _ => Some(f.to_ascii_lowercase().cmp(&value.text.to_ascii_lowercase())),
            };
            ordering.is_some_and(|o| match op {
                ComparisonOp::Lt => o.is_lt(),
                ComparisonOp::Le => o.is_le(),
                ComparisonOp::Gt => o.is_gt(),
                _ => o.is_ge(),
            })
        }),
    }
}

fn property_fields<'a>(knowledge: &'a Knowledge, property: &str) -> Vec<&'a str> {
    let property = property.to_ascii_lowercase();
    let is = |name: &str| property == name.to_ascii_lowercase();
    match knowledge {
        Knowledge::Entity(e) if is(property_names::NAME) => vec![e.name.as_str()],
        Knowledge::Entity(e) if is(property_names::TYPE) => {
            e.types.iter().map(String::as_str).collect()
        }
        Knowledge::Entity(e) if is(property_names::FACET_NAME) => {
            e.facets.iter().map(|f| f.name.as_str()).collect()
        }
        Knowledge::Entity(e) if is(property_names::FACET_VALUE) => {
            e.facets.iter().map(|f| f.value.as_str()).collect()
        }
        Knowledge::Action(a) if is(property_names::VERB) => {
            a.verbs.iter().map(String::as_str).collect()
        }
        Knowledge::Action(a) if is(property_names::SUBJECT) => {
            a.subject.as_deref().into_iter().collect()
        }
        Knowledge::Action(a) if is(property_names::OBJECT) => {
            a.object.as_deref().into_iter().collect()
        }
        Knowledge::Action(a) if is(property_names::INDIRECT_OBJECT) => {
            a.indirect_object.as_deref().into_iter().collect()
        }
        Knowledge::Topic(t) if is(property_names::TOPIC) => vec![t.as_str()],
        Knowledge::Tag(t) if is(property_names::TAG) => vec![t.as_str()],
        _ => Vec::new(),
    }
}

fn all_fields(knowledge: &Knowledge) -> Vec<&str> {
    match knowledge {
        Knowledge::Entity(e) => std::iter::once(e.name.as_str())
            .chain(e.types.iter().map(String::as_str))
            .chain(e.facets.iter().map(|f| f.value.as_str()))
            .collect(),
        Knowledge::Action(a) => a
            .verbs
            .iter()
            .map(String::as_str)
            .chain(a.subject.as_deref())
            .chain(a.object.as_deref())
            .chain(a.indirect_object.as_deref())
            .collect(),
        Knowledge::Topic(t) | Knowledge::Tag(t) => vec![t.as_str()],
    }
}

/// Lowercased words of three or more characters.
fn words(text: &str) -> Vec<String> {
    let mut out: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect();
    out.sort();
    out.dedup();
    out
}
