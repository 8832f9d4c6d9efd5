//! Term group → parameterized SQL predicate.
//!
//! Values never reach the SQL text: every comparison binds a numbered
//! `?N` placeholder, identifiers are validated and quoted, and operators come
//! from the fixed [`ComparisonOp::as_sql`] table. All validation happens
//! here, so a bad filter fails before any statement is prepared.

use rusqlite::types::Value;

use lore_core::errors::FrameError;
use lore_core::query::{BooleanOp, ComparisonOp, PropertySearchTerm, SearchTermGroup, Term};
use lore_core::LoreResult;

use crate::schema::{quote, DataFrameSchema};
use crate::value::coerce_value;

/// A compiled WHERE clause plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledPredicate {
    pub(crate) fn param_refs(&self) -> Vec<&dyn rusqlite::types::ToSql> {
        self.params
            .iter()
            .map(|p| p as &dyn rusqlite::types::ToSql)
            .collect()
    }
}

/// Compile `group` against `schema`.
///
/// An empty group compiles to `0` and matches nothing. Nested groups become
/// parenthesized sub-expressions. Related terms on a property value expand
/// to an OR over every alternative (AND for `!=`).
pub fn compile_predicate(
    group: &SearchTermGroup,
    schema: &DataFrameSchema,
    table: &str,
) -> LoreResult<CompiledPredicate> {
    let mut compiler = Compiler {
        schema,
        table,
        params: Vec::new(),
    };
    let sql = compiler.group(group)?;
    Ok(CompiledPredicate {
        sql,
        params: compiler.params,
    })
}

struct Compiler<'a> {
    schema: &'a DataFrameSchema,
    table: &'a str,
    params: Vec<Value>,
}

impl Compiler<'_> {
    fn group(&mut self, group: &SearchTermGroup) -> LoreResult<String> {
        if group.is_empty() {
            return Ok("0".to_string());
        }
        let joiner = match group.boolean_op {
            BooleanOp::And => " AND ",
            BooleanOp::Or | BooleanOp::OrMax => " OR ",
        };
        let mut parts = Vec::with_capacity(group.len());
        for term in &group.terms {
            let part = match term {
                Term::Property(p) => self.property(p)?,
                Term::Group(g) => format!("({})", self.group(g)?),
                Term::Search(t) => {
                    return Err(FrameError::UnsupportedTerm {
                        reason: format!("free-text term '{}' has no column", t.text),
                    }
                    .into())
                }
            };
            parts.push(part);
        }
        Ok(parts.join(joiner))
    }

    fn property(&mut self, term: &PropertySearchTerm) -> LoreResult<String> {
        let column = term.property_name.as_str();
        let def = self
            .schema
            .get(column)
            .ok_or_else(|| FrameError::UnknownColumn {
                table: self.table.to_string(),
                column: column.to_string(),
            })?;
        let op = term.op();
        let mut comparisons = Vec::new();
        for alternative in term.property_value.alternatives() {
            let value = coerce_value(column, def, alternative)?;
            self.params.push(value);
            comparisons.push(format!("{} {} ?{}", quote(column), op.as_sql(), self.params.len()));
        }
        Ok(match comparisons.len() {
            1 => comparisons.remove(0),
            _ => {
                let joiner = if op == ComparisonOp::Ne { " AND " } else { " OR " };
                format!("({})", comparisons.join(joiner))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataFrameColumnDef;
    use lore_core::query::SearchTerm;

    fn schema() -> DataFrameSchema {
        DataFrameSchema::new()
            .column("latitude", DataFrameColumnDef::string())
            .column("price", DataFrameColumnDef::number())
    }

    fn prop(name: &str, value: &str) -> Term {
        Term::Property(PropertySearchTerm::new(name, value))
    }

    #[test]
    fn nested_groups_are_parenthesized() {
        let group = SearchTermGroup::and([
            prop("latitude", "47.6"),
            Term::Group(SearchTermGroup::or([prop("price", "1"), prop("price", "2")])),
        ]);
        let compiled = compile_predicate(&group, &schema(), "t").unwrap();
        assert_eq!(compiled.sql, "\"latitude\" = ?1 AND (\"price\" = ?2 OR \"price\" = ?3)");
        assert_eq!(
            compiled.params,
            vec![Value::Text("47.6".into()), Value::Real(1.0), Value::Real(2.0)]
        );
    }

    #[test]
    fn values_never_appear_in_sql() {
        let group = SearchTermGroup::and([prop("latitude", "1' OR '1'='1")]);
        let compiled = compile_predicate(&group, &schema(), "t").unwrap();
        assert!(!compiled.sql.contains('\''));
        assert_eq!(compiled.params.len(), 1);
    }

    #[test]
    fn related_terms_expand() {
        let term = PropertySearchTerm {
            property_name: "latitude".into(),
            property_value: SearchTerm::new("47.6").with_related(["47.60"]),
            compare_op: None,
        };
        let group = SearchTermGroup::and([Term::Property(term)]);
        let compiled = compile_predicate(&group, &schema(), "t").unwrap();
        assert_eq!(compiled.sql, "(\"latitude\" = ?1 OR \"latitude\" = ?2)");
    }

    #[test]
    fn empty_group_matches_nothing() {
        let compiled =
            compile_predicate(&SearchTermGroup::new(BooleanOp::Or), &schema(), "t").unwrap();
        assert_eq!(compiled.sql, "0");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn free_text_terms_unsupported() {
        let group = SearchTermGroup::or([Term::Search(SearchTerm::new("seattle"))]);
        let err = compile_predicate(&group, &schema(), "t").unwrap_err();
        assert!(matches!(err, lore_core::LoreError::Frame(FrameError::UnsupportedTerm { .. })));
    }

    #[test]
    fn operators_come_from_fixed_table() {
        let term = PropertySearchTerm::new("price", "10").with_op(ComparisonOp::Ge);
        let group = SearchTermGroup::and([Term::Property(term)]);
        let compiled = compile_predicate(&group, &schema(), "t").unwrap();
        assert_eq!(compiled.sql, "\"price\" >= ?1");
    }
}
