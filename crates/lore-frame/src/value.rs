//! Row values, source references, and type coercion.

use std::collections::BTreeMap;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use lore_core::errors::FrameError;
use lore_core::query::TextRange;
use lore_core::LoreResult;

use crate::schema::{ColumnType, DataFrameColumnDef};

/// A cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataFrameValue {
    Number(f64),
    String(String),
    Null,
}

impl DataFrameValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub(crate) fn from_sql(value: Value) -> Self {
        match value {
            Value::Null | Value::Blob(_) => Self::Null,
            Value::Integer(i) => Self::Number(i as f64),
            Value::Real(r) => Self::Number(r),
            Value::Text(s) => Self::String(s),
        }
    }
}

impl From<&str> for DataFrameValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DataFrameValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for DataFrameValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Back-reference from a row to the conversation text it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataFrameSourceRef {
    pub range: TextRange,
}

impl DataFrameSourceRef {
    pub fn new(range: TextRange) -> Self {
        Self { range }
    }

    pub fn message(message_ordinal: u32) -> Self {
        Self::new(TextRange::message(message_ordinal))
    }

    pub(crate) fn to_json(&self) -> LoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub(crate) fn from_json(json: &str) -> LoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One row: a source reference plus a flat record. Columns missing from
/// the record are stored as NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrameRow {
    pub source_ref: DataFrameSourceRef,
    pub record: BTreeMap<String, DataFrameValue>,
}

impl DataFrameRow {
    pub fn new(source_ref: DataFrameSourceRef) -> Self {
        Self {
            source_ref,
            record: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<DataFrameValue>) -> Self {
        self.record.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&DataFrameValue> {
        self.record.get(column)
    }
}

/// Coerce query text to the column's declared type.
pub fn coerce_value(column: &str, def: &DataFrameColumnDef, text: &str) -> LoreResult<Value> {
    match def.column_type {
        ColumnType::String => Ok(Value::Text(text.to_string())),
        ColumnType::Number => parse_number(text)
            .map(Value::Real)
            .ok_or_else(|| type_mismatch(column, def.column_type, text)),
    }
}

/// Coerce a stored cell value to the column's declared type.
pub(crate) fn coerce_cell(
    column: &str,
    def: &DataFrameColumnDef,
    value: &DataFrameValue,
) -> LoreResult<Value> {
    match (def.column_type, value) {
        (_, DataFrameValue::Null) => Ok(Value::Null),
        (ColumnType::String, DataFrameValue::String(s)) => Ok(Value::Text(s.clone())),
        (ColumnType::String, DataFrameValue::Number(n)) => Ok(Value::Text(n.to_string())),
        (ColumnType::Number, DataFrameValue::Number(n)) if n.is_finite() => Ok(Value::Real(*n)),
        (ColumnType::Number, DataFrameValue::Number(n)) => {
            Err(type_mismatch(column, def.column_type, &n.to_string()))
        }
        (ColumnType::Number, DataFrameValue::String(s)) => coerce_value(column, def, s),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn type_mismatch(column: &str, expected: ColumnType, value: &str) -> lore_core::LoreError {
    FrameError::TypeMismatch {
        column: column.to_string(),
        expected: expected.as_str().to_string(),
        value: value.to_string(),
    }
    .into()
}
