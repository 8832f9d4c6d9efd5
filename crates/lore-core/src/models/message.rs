use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message of the conversation's append-only sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub ordinal: u32,
    pub text_chunks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Message {
    pub fn new(ordinal: u32, text: impl Into<String>) -> Self {
        Self {
            ordinal,
            text_chunks: vec![text.into()],
            timestamp: None,
            speaker: None,
            tags: Vec::new(),
        }
    }

    /// All chunks joined with a single space.
    pub fn text(&self) -> String {
        self.text_chunks.join(" ")
    }
}
