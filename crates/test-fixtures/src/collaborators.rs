//! Scripted stand-ins for the model-backed collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use lore_core::models::{AnswerRequest, AnswerResponse, ConcreteEntity, KnowledgeResponse};
use lore_core::query::SearchQuery;
use lore_core::traits::{
    IAnswerGenerator, IKnowledgeExtractor, IQueryTranslator, IRelaxationConsent, TranslationHints,
};
use lore_core::{LoreError, LoreResult};

// ── Translator ────────────────────────────────────────────────────────────

/// Returns a canned query (or failure) per exact question text.
#[derive(Default)]
pub struct ScriptedTranslator {
    scripts: HashMap<String, Result<SearchQuery, String>>,
    calls: AtomicUsize,
    hints: Mutex<Vec<TranslationHints>>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, text: &str, query: SearchQuery) -> Self {
        self.scripts.insert(text.to_string(), Ok(query));
        self
    }

    pub fn with_failure(mut self, text: &str, reason: &str) -> Self {
        self.scripts.insert(text.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Hints received, in call order.
    pub fn hints(&self) -> Vec<TranslationHints> {
        self.hints.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl IQueryTranslator for ScriptedTranslator {
    async fn translate(&self, text: &str, hints: &TranslationHints) -> LoreResult<SearchQuery> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hints.clone());
        match self.scripts.get(text) {
            Some(Ok(query)) => Ok(query.clone()),
            Some(Err(reason)) => Err(LoreError::TranslationFailure {
                reason: reason.clone(),
            }),
            None => Err(LoreError::TranslationFailure {
                reason: format!("no translation scripted for '{text}'"),
            }),
        }
    }
}

// ── Generator ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Script {
    Answer(String),
    PerChunk(Vec<String>),
    Echo,
    NoAnswer(String),
    Fail(String),
}

/// Streams a scripted answer in fixed-size character chunks and records
/// every request it receives.
pub struct ScriptedGenerator {
    script: Script,
    chunk_size: usize,
    requests: Mutex<Vec<AnswerRequest>>,
}

impl ScriptedGenerator {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            chunk_size: 4,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::with_script(Script::Answer(text.to_string()))
    }

    /// Answer `answers[request.chunk_index]` (the last one past the end).
    pub fn answering_per_chunk(answers: &[&str]) -> Self {
        Self::with_script(Script::PerChunk(answers.iter().map(|a| a.to_string()).collect()))
    }

    /// Answer with the evidence texts joined by newlines.
    pub fn echoing() -> Self {
        Self::with_script(Script::Echo)
    }

    pub fn no_answer(why: &str) -> Self {
        Self::with_script(Script::NoAnswer(why.to_string()))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_script(Script::Fail(reason.to_string()))
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn requests(&self) -> Vec<AnswerRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn stream(&self, text: &str, on_chunk: &mut (dyn FnMut(&str) + Send)) {
        let chars: Vec<char> = text.chars().collect();
        for piece in chars.chunks(self.chunk_size) {
            on_chunk(&piece.iter().collect::<String>());
        }
    }
}

impl IAnswerGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &AnswerRequest,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> LoreResult<AnswerResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let text = match &self.script {
            Script::Answer(text) => text.clone(),
            Script::PerChunk(answers) => match answers.get(request.chunk_index).or(answers.last()) {
                Some(text) => text.clone(),
                None => return Ok(AnswerResponse::no_answer("nothing scripted")),
            },
            Script::Echo => {
                if request.evidence.is_empty() {
                    return Ok(AnswerResponse::no_answer("no evidence"));
                }
                request
                    .evidence
                    .iter()
                    .map(|e| e.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Script::NoAnswer(why) => return Ok(AnswerResponse::no_answer(why.clone())),
            Script::Fail(reason) => {
                return Err(LoreError::GenerationFailure {
                    reason: reason.clone(),
                })
            }
        };
        self.stream(&text, on_chunk);
        Ok(AnswerResponse::answered(text))
    }
}

// ── Consent ───────────────────────────────────────────────────────────────

/// Fixed consent answer that counts how often it was asked.
pub struct CountingConsent {
    answer: bool,
    asked: AtomicUsize,
}

impl CountingConsent {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl IRelaxationConsent for CountingConsent {
    async fn consent_to_relax(&self, _query_text: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

// ── Extractor ─────────────────────────────────────────────────────────────

/// Extracts every capitalized word as a `name` entity; fails on texts
/// containing a configured marker.
pub struct ScriptedExtractor {
    model: String,
    fail_markers: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            fail_markers: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IKnowledgeExtractor for ScriptedExtractor {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn extract(&self, text: &str) -> LoreResult<KnowledgeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = self.fail_markers.iter().find(|m| text.contains(m.as_str())) {
            return Err(LoreError::GenerationFailure {
                reason: format!("extraction refused text containing '{marker}'"),
            });
        }
        let mut entities: Vec<ConcreteEntity> = Vec::new();
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if word.chars().next().is_some_and(char::is_uppercase)
                && !entities.iter().any(|e| e.name == word)
            {
                entities.push(ConcreteEntity::new(word, &["name"]));
            }
        }
        Ok(KnowledgeResponse {
            entities,
            ..Default::default()
        })
    }
}
