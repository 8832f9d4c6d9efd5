//! Well-known property names used by property search terms.
//!
//! Data frame columns are matched by the same mechanism, so any column name
//! is also a valid property name when a frame is in scope.

pub const NAME: &str = "name";
pub const TYPE: &str = "type";
pub const VERB: &str = "verb";
pub const SUBJECT: &str = "subject";
pub const OBJECT: &str = "object";
pub const INDIRECT_OBJECT: &str = "indirectObject";
pub const TOPIC: &str = "topic";
pub const TAG: &str = "tag";
pub const FACET_NAME: &str = "facet.name";
pub const FACET_VALUE: &str = "facet.value";

/// All knowledge facets the index understands natively.
pub const KNOWLEDGE_PROPERTIES: &[&str] = &[
    NAME,
    TYPE,
    VERB,
    SUBJECT,
    OBJECT,
    INDIRECT_OBJECT,
    TOPIC,
    TAG,
    FACET_NAME,
    FACET_VALUE,
];

/// Whether `name` is one of the built-in knowledge properties.
pub fn is_knowledge_property(name: &str) -> bool {
    KNOWLEDGE_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
}
