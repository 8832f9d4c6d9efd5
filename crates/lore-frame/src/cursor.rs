//! Restartable lazy enumeration of a table.

use std::collections::VecDeque;
use std::sync::Arc;

use lore_core::LoreResult;

use crate::pool::ReadPool;
use crate::schema::{quote, DataFrameSchema, ROW_ID_COLUMN};
use crate::table::{decode_row, select_list};
use crate::to_storage_err;
use crate::value::DataFrameRow;

/// Keyset-paged iterator over a table's rows in insertion order.
///
/// Each page is a separate read, so the cursor holds no connection between
/// pages. Only an empty page ends the enumeration, so rows appended before
/// the cursor reports its end are picked up. The cursor blocks on the read
/// pool; async callers drive it from `spawn_blocking`. After an error the
/// cursor is exhausted.
pub struct RowCursor {
    readers: Arc<ReadPool>,
    schema: Arc<DataFrameSchema>,
    sql: String,
    page_size: usize,
    last_row_id: i64,
    buffer: VecDeque<DataFrameRow>,
    exhausted: bool,
}

impl RowCursor {
    pub(crate) fn new(
        readers: Arc<ReadPool>,
        table: &str,
        schema: Arc<DataFrameSchema>,
        page_size: usize,
    ) -> Self {
        let sql = format!(
            "SELECT {} FROM {} WHERE {ROW_ID_COLUMN} > ?1 ORDER BY {ROW_ID_COLUMN} LIMIT ?2",
            select_list(&schema),
            quote(table)
        );
        Self {
            readers,
            schema,
            sql,
            page_size,
            last_row_id: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> LoreResult<()> {
        let schema = &self.schema;
        let sql = &self.sql;
        let after = self.last_row_id;
        let limit = self.page_size as i64;
        let page = self.readers.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(sql).map_err(|e| to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map(rusqlite::params![after, limit], |row| decode_row(row, schema))
                .map_err(|e| to_storage_err(e.to_string()))?;
            let mut page = Vec::new();
            for row in rows {
                let (row_id, row) = row.map_err(|e| to_storage_err(e.to_string()))?;
                page.push((row_id, row?));
            }
            Ok(page)
        })?;

        if page.is_empty() {
            self.exhausted = true;
        }
        if let Some((row_id, _)) = page.last() {
            self.last_row_id = *row_id;
        }
        self.buffer.extend(page.into_iter().map(|(_, row)| row));
        Ok(())
    }
}

impl Iterator for RowCursor {
    type Item = LoreResult<DataFrameRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
