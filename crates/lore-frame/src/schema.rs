//! Column schemas. Fixed at table creation, immutable afterwards.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use lore_core::errors::FrameError;
use lore_core::LoreResult;

/// Columns every table carries in addition to its declared schema.
pub const ROW_ID_COLUMN: &str = "row_id";
pub const SOURCE_REF_COLUMN: &str = "source_ref";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Number,
}

impl ColumnType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }

    pub(crate) const fn sql_type(self) -> &'static str {
        match self {
            Self::String => "TEXT",
            Self::Number => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFrameColumnDef {
    pub column_type: ColumnType,
    /// Create an index on this column.
    #[serde(default)]
    pub index: bool,
}

impl DataFrameColumnDef {
    pub const fn string() -> Self {
        Self {
            column_type: ColumnType::String,
            index: false,
        }
    }

    pub const fn number() -> Self {
        Self {
            column_type: ColumnType::Number,
            index: false,
        }
    }

    pub const fn indexed(mut self) -> Self {
        self.index = true;
        self
    }
}

/// Ordered mapping from column name to definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFrameSchema {
    columns: Vec<(String, DataFrameColumnDef)>,
}

impl DataFrameSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. A repeated name replaces the earlier definition in place.
    pub fn column(mut self, name: impl Into<String>, def: DataFrameColumnDef) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = def,
            None => self.columns.push((name, def)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&DataFrameColumnDef> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &DataFrameColumnDef)> {
        self.columns.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reject invalid or reserved column names.
    pub fn validate(&self) -> LoreResult<()> {
        for (name, _) in &self.columns {
            validate_identifier(name)?;
            if name.eq_ignore_ascii_case(ROW_ID_COLUMN)
                || name.eq_ignore_ascii_case(SOURCE_REF_COLUMN)
            {
                return Err(FrameError::InvalidIdentifier { name: name.clone() }.into());
            }
        }
        Ok(())
    }
}

static IDENTIFIER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// Table and column names must be plain identifiers.
pub fn validate_identifier(name: &str) -> LoreResult<()> {
    let plain = IDENTIFIER_RE.as_ref().is_some_and(|re| re.is_match(name));
    if plain && !name.to_ascii_lowercase().starts_with("sqlite_") {
        Ok(())
    } else {
        Err(FrameError::InvalidIdentifier {
            name: name.to_string(),
        }
        .into())
    }
}

/// Double-quote a validated identifier.
pub(crate) fn quote(name: &str) -> String {
    format!("\"{name}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(validate_identifier("latitude").is_ok());
        assert!(validate_identifier("_col2").is_ok());
        assert!(validate_identifier("2col").is_err());
        assert!(validate_identifier("lat; DROP TABLE geo").is_err());
        assert!(validate_identifier("sqlite_master").is_err());
    }

    #[test]
    fn reserved_columns_rejected() {
        let schema = DataFrameSchema::new().column("source_ref", DataFrameColumnDef::string());
        assert!(schema.validate().is_err());
    }

    #[test]
    fn column_order_is_preserved() {
        let schema = DataFrameSchema::new()
            .column("b", DataFrameColumnDef::number())
            .column("a", DataFrameColumnDef::string())
            .column("b", DataFrameColumnDef::number().indexed());
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(schema.get("b").unwrap().index);
    }
}
