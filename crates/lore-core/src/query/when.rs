//! "When" filters: knowledge type, date range, and ordinal scope.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Message;

/// Kind of extracted knowledge a semantic ref carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeType {
    Entity,
    Action,
    Topic,
    Tag,
}

impl KnowledgeType {
    pub const ALL: [KnowledgeType; 4] = [Self::Entity, Self::Action, Self::Topic, Self::Tag];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Action => "action",
            Self::Topic => "topic",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A date range. **Both bounds are inclusive instants**; `end = None` is
/// open-ended. An end at midnight admits nothing later that day; use
/// [`DateRange::widen_to_days`] to cover the whole end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Start after end.
    pub fn is_degenerate(&self) -> bool {
        self.end.is_some_and(|end| self.start > end)
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && self.end.map_or(true, |end| timestamp <= end)
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        let starts_before_other_ends = other.end.map_or(true, |end| self.start <= end);
        let other_starts_before_end = self.end.map_or(true, |end| other.start <= end);
        starts_before_other_ends && other_starts_before_end
    }

    /// Widen to whole UTC days: start at 00:00:00.000, end at 23:59:59.999.
    pub fn widen_to_days(&self) -> DateRange {
        let start = self.start.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = self.end.map(|end| {
            let last_ms = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
            end.date_naive().and_time(last_ms).and_utc()
        });
        DateRange { start, end }
    }
}

/// Position of a text chunk inside the append-only message sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TextLocation {
    pub message_ordinal: u32,
    #[serde(default)]
    pub chunk_ordinal: u32,
}

impl TextLocation {
    pub const fn new(message_ordinal: u32, chunk_ordinal: u32) -> Self {
        Self {
            message_ordinal,
            chunk_ordinal,
        }
    }

    pub const fn message(message_ordinal: u32) -> Self {
        Self::new(message_ordinal, 0)
    }
}

/// Ordinal-addressed range of the message sequence.
///
/// `end` is **exclusive**. `end = None` covers exactly the start message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<TextLocation>,
}

impl TextRange {
    /// Range covering a single message.
    pub const fn message(message_ordinal: u32) -> Self {
        Self {
            start: TextLocation::message(message_ordinal),
            end: None,
        }
    }

    /// Messages `start..end` (end exclusive).
    pub const fn messages(start: u32, end: u32) -> Self {
        Self {
            start: TextLocation::message(start),
            end: Some(TextLocation::message(end)),
        }
    }

    pub fn contains_message(&self, message_ordinal: u32) -> bool {
        match self.end {
            None => message_ordinal == self.start.message_ordinal,
            Some(end) => {
                message_ordinal >= self.start.message_ordinal
                    && (message_ordinal < end.message_ordinal
                        || (message_ordinal == end.message_ordinal && end.chunk_ordinal > 0))
            }
        }
    }

    /// Every message ordinal the range touches, ascending.
    pub fn message_ordinals(&self) -> Vec<u32> {
        match self.end {
            None => vec![self.start.message_ordinal],
            Some(end) => {
                let last = if end.chunk_ordinal > 0 {
                    end.message_ordinal.saturating_add(1)
                } else {
                    end.message_ordinal
                };
                (self.start.message_ordinal..last).collect()
            }
        }
    }

    /// Restrict the range to messages `0..message_count`.
    /// Returns `None` when nothing of the range survives.
    pub fn clamp_to(&self, message_count: u32) -> Option<TextRange> {
        if self.start.message_ordinal >= message_count {
            return None;
        }
        let end = self.end.map(|end| {
            if end.message_ordinal >= message_count {
                TextLocation::message(message_count)
            } else {
                end
            }
        });
        let clamped = TextRange {
            start: self.start,
            end,
        };
        if clamped.message_ordinals().is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}

/// Restricts where and what a select expression may match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhenFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_type: Option<KnowledgeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// `Some(vec![])` scopes to nothing; `None` means unrestricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_ranges_in_scope: Option<Vec<TextRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl WhenFilter {
    pub fn is_empty(&self) -> bool {
        self.knowledge_type.is_none()
            && self.date_range.is_none()
            && self.text_ranges_in_scope.is_none()
            && self.thread_description.is_none()
            && self.tags.is_none()
    }

    pub fn in_scope(&self, message_ordinal: u32) -> bool {
        self.text_ranges_in_scope
            .as_ref()
            .map_or(true, |ranges| ranges.iter().any(|r| r.contains_message(message_ordinal)))
    }

    pub fn in_date_range(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        match (self.date_range, timestamp) {
            (None, _) => true,
            (Some(range), Some(ts)) => range.contains(ts),
            // Undated messages cannot satisfy a date constraint.
            (Some(_), None) => false,
        }
    }

    /// Any of the message's tags is wanted, ignoring case. No tag filter
    /// admits every message.
    pub fn has_tag(&self, message_tags: &[String]) -> bool {
        self.tags.as_ref().map_or(true, |wanted| {
            message_tags
                .iter()
                .any(|t| wanted.iter().any(|want| want.eq_ignore_ascii_case(t)))
        })
    }

    /// Ordinal scope, date range and tags all admit the message. The
    /// knowledge type does not constrain messages.
    pub fn admits_message(&self, message: &Message) -> bool {
        self.in_scope(message.ordinal)
            && self.in_date_range(message.timestamp)
            && self.has_tag(&message.tags)
    }
}
