//! DataFrameTable: typed rows with source references, queried by term group.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rusqlite::types::Value;
use tracing::debug;

use lore_core::errors::FrameError;
use lore_core::query::{ComparisonOp, PropertySearchTerm, SearchTermGroup, Term};
use lore_core::LoreResult;

use crate::cursor::RowCursor;
use crate::pool::ConnectionPool;
use crate::predicate::compile_predicate;
use crate::schema::{quote, DataFrameSchema, ROW_ID_COLUMN, SOURCE_REF_COLUMN};
use crate::to_storage_err;
use crate::value::{coerce_cell, DataFrameRow, DataFrameSourceRef, DataFrameValue};

/// Handle to one table in a [`crate::FrameStore`]. Clones share the pool.
#[derive(Clone)]
pub struct DataFrameTable {
    name: Arc<str>,
    schema: Arc<DataFrameSchema>,
    pool: Arc<ConnectionPool>,
    page_size: usize,
}

impl std::fmt::Debug for DataFrameTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFrameTable")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl DataFrameTable {
    pub(crate) fn new(
        name: &str,
        schema: DataFrameSchema,
        pool: Arc<ConnectionPool>,
        page_size: usize,
    ) -> Self {
        Self {
            name: Arc::from(name),
            schema: Arc::new(schema),
            pool,
            page_size: page_size.max(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &DataFrameSchema {
        &self.schema
    }

    /// Insert rows in one transaction. Every row is validated and coerced
    /// before anything is written, so a bad row leaves the table untouched.
    pub async fn add_rows(&self, rows: &[DataFrameRow]) -> LoreResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let encoded = rows
            .iter()
            .map(|row| self.encode_row(row))
            .collect::<LoreResult<Vec<_>>>()?;

        let mut columns = vec![SOURCE_REF_COLUMN.to_string()];
        columns.extend(self.schema.names().map(quote));
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(&self.name),
            columns.join(", "),
            placeholders.join(", ")
        );

        let inserted = self
            .pool
            .writer
            .with_conn(|conn| {
                let tx = conn
                    .unchecked_transaction()
                    .map_err(|e| to_storage_err(e.to_string()))?;
                {
                    let mut stmt = tx.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
                    for values in &encoded {
                        stmt.execute(rusqlite::params_from_iter(values.iter()))
                            .map_err(|e| to_storage_err(e.to_string()))?;
                    }
                }
                tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
                Ok(encoded.len())
            })
            .await?;
        debug!(table = %self.name, rows = inserted, "rows added");
        Ok(inserted)
    }

    fn encode_row(&self, row: &DataFrameRow) -> LoreResult<Vec<Value>> {
        if let Some(unknown) = row.record.keys().find(|k| !self.schema.contains(k)) {
            return Err(FrameError::UnknownColumn {
                table: self.name.to_string(),
                column: unknown.clone(),
            }
            .into());
        }
        let mut values = Vec::with_capacity(self.schema.len() + 1);
        values.push(Value::Text(row.source_ref.to_json()?));
        for (column, def) in self.schema.columns() {
            let value = match row.record.get(column) {
                Some(v) => coerce_cell(column, def, v)?,
                None => Value::Null,
            };
            values.push(value);
        }
        Ok(values)
    }

    /// Point lookup: rows where `column op value`. Empty when nothing matches.
    pub async fn get_row(
        &self,
        column: &str,
        value: &str,
        op: ComparisonOp,
    ) -> LoreResult<Vec<DataFrameRow>> {
        let term = PropertySearchTerm::new(column, value).with_op(op);
        self.find_rows(&SearchTermGroup::and([Term::Property(term)])).await
    }

    /// Rows matching the group, in insertion order.
    pub async fn find_rows(&self, group: &SearchTermGroup) -> LoreResult<Vec<DataFrameRow>> {
        let predicate = compile_predicate(group, &self.schema, &self.name)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {ROW_ID_COLUMN}",
            select_list(&self.schema),
            quote(&self.name),
            predicate.sql
        );
        let schema = Arc::clone(&self.schema);
        self.pool
            .read(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
                let rows = stmt
                    .query_map(predicate.param_refs().as_slice(), |row| decode_row(row, &schema))
                    .map_err(|e| to_storage_err(e.to_string()))?;
                let mut out = Vec::new();
                for row in rows {
                    let (_, row) = row.map_err(|e| to_storage_err(e.to_string()))?;
                    out.push(row?);
                }
                Ok(out)
            })
            .await
    }

    /// Distinct source references of matching rows. Order is unspecified.
    pub async fn find_sources(
        &self,
        group: &SearchTermGroup,
    ) -> LoreResult<Vec<DataFrameSourceRef>> {
        let predicate = compile_predicate(group, &self.schema, &self.name)?;
        let sql = format!(
            "SELECT DISTINCT {SOURCE_REF_COLUMN} FROM {} WHERE {}",
            quote(&self.name),
            predicate.sql
        );
        let table = Arc::clone(&self.name);
        let sources = self
            .pool
            .read(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
                let refs = stmt
                    .query_map(predicate.param_refs().as_slice(), |row| row.get::<_, String>(0))
                    .map_err(|e| to_storage_err(e.to_string()))?;
                let mut seen = HashSet::new();
                let mut out = Vec::new();
                for json in refs {
                    let json = json.map_err(|e| to_storage_err(e.to_string()))?;
                    let source = DataFrameSourceRef::from_json(&json)?;
                    if seen.insert(source.clone()) {
                        out.push(source);
                    }
                }
                Ok(out)
            })
            .await?;
        debug!(table = %table, sources = sources.len(), "find_sources");
        Ok(sources)
    }

    /// A fresh lazy cursor over every row, in insertion order.
    pub fn rows(&self) -> RowCursor {
        RowCursor::new(
            Arc::clone(&self.pool.readers),
            &self.name,
            Arc::clone(&self.schema),
            self.page_size,
        )
    }

    pub async fn row_count(&self) -> LoreResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote(&self.name));
        self.pool
            .read(move |conn| {
                conn.query_row(&sql, [], |row| row.get::<_, i64>(0))
                    .map(|n| n.max(0) as u64)
                    .map_err(|e| to_storage_err(e.to_string()))
            })
            .await
    }
}

/// `row_id, source_ref, "col", ...`
pub(crate) fn select_list(schema: &DataFrameSchema) -> String {
    let mut columns = vec![ROW_ID_COLUMN.to_string(), SOURCE_REF_COLUMN.to_string()];
    columns.extend(schema.names().map(quote));
    columns.join(", ")
}

/// Decode one row selected with [`select_list`]. The outer result carries
/// SQLite errors, the inner one source-ref decoding errors.
pub(crate) fn decode_row(
    row: &rusqlite::Row<'_>,
    schema: &DataFrameSchema,
) -> rusqlite::Result<(i64, LoreResult<DataFrameRow>)> {
    let row_id: i64 = row.get(0)?;
    let source_json: String = row.get(1)?;
    let mut record = BTreeMap::new();
    for (i, name) in schema.names().enumerate() {
        let value: Value = row.get(i + 2)?;
        record.insert(name.to_string(), DataFrameValue::from_sql(value));
    }
    let decoded = DataFrameSourceRef::from_json(&source_json)
        .map(|source_ref| DataFrameRow { source_ref, record });
    Ok((row_id, decoded))
}
