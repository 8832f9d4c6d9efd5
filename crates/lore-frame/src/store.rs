//! FrameStore: owns the connection pool and the table catalog.

use std::path::Path;
use std::sync::Arc;

use rusqlite::OptionalExtension;
use tracing::{debug, info};

use lore_core::config::FrameConfig;
use lore_core::errors::FrameError;
use lore_core::LoreResult;

use crate::pool::ConnectionPool;
use crate::schema::{quote, validate_identifier, DataFrameSchema, ROW_ID_COLUMN, SOURCE_REF_COLUMN};
use crate::table::DataFrameTable;
use crate::to_storage_err;

/// Catalog of created tables and their schemas.
const CATALOG_TABLE: &str = "_lore_frames";

/// The backing store for data frames. Cheap to clone tables out of; the
/// pool is shared.
pub struct FrameStore {
    pool: Arc<ConnectionPool>,
    page_size: usize,
}

impl FrameStore {
    /// Open a store backed by a file on disk.
    pub async fn open(path: &Path, config: &FrameConfig) -> LoreResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        Self::initialize(pool, config).await
    }

    /// Open a private in-memory store.
    pub async fn open_in_memory(config: &FrameConfig) -> LoreResult<Self> {
        let pool = ConnectionPool::open_in_memory(config)?;
        Self::initialize(pool, config).await
    }

    /// Open per config: `db_path` set means file-backed.
    pub async fn from_config(config: &FrameConfig) -> LoreResult<Self> {
        match &config.db_path {
            Some(path) => Self::open(Path::new(path), config).await,
            None => Self::open_in_memory(config).await,
        }
    }

    async fn initialize(pool: ConnectionPool, config: &FrameConfig) -> LoreResult<Self> {
        pool.writer
            .with_conn(|conn| {
                conn.execute_batch(&format!(
                    "CREATE TABLE IF NOT EXISTS {CATALOG_TABLE} (
                        name TEXT PRIMARY KEY,
                        schema TEXT NOT NULL
                    );"
                ))
                .map_err(|e| to_storage_err(e.to_string()))
            })
            .await?;
        debug!(
            in_memory = pool.is_in_memory(),
            readers = pool.readers.size(),
            "frame store opened"
        );
        Ok(Self {
            pool: Arc::new(pool),
            page_size: config.cursor_page_size,
        })
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Create a table, or return the existing one when the schema matches.
    pub async fn create_table(
        &self,
        name: &str,
        schema: DataFrameSchema,
    ) -> LoreResult<DataFrameTable> {
        validate_identifier(name)?;
        if name.eq_ignore_ascii_case(CATALOG_TABLE) {
            return Err(FrameError::InvalidIdentifier { name: name.to_string() }.into());
        }
        schema.validate()?;
        let schema_json = serde_json::to_string(&schema)?;

        let created = self
            .pool
            .writer
            .with_conn(|conn| {
                let existing: Option<String> = conn
                    .query_row(
                        &format!("SELECT schema FROM {CATALOG_TABLE} WHERE name = ?1"),
                        [name],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|e| to_storage_err(e.to_string()))?;
                if let Some(existing) = existing {
                    let existing: DataFrameSchema = serde_json::from_str(&existing)?;
                    if existing != schema {
                        return Err(to_storage_err(format!(
                            "data frame '{name}' already exists with a different schema"
                        )));
                    }
                    return Ok(false);
                }

                let tx = conn
                    .unchecked_transaction()
                    .map_err(|e| to_storage_err(e.to_string()))?;
                tx.execute_batch(&create_table_ddl(name, &schema))
                    .map_err(|e| to_storage_err(e.to_string()))?;
                tx.execute(
                    &format!("INSERT INTO {CATALOG_TABLE} (name, schema) VALUES (?1, ?2)"),
                    [name, schema_json.as_str()],
                )
                .map_err(|e| to_storage_err(e.to_string()))?;
                tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
                Ok(true)
            })
            .await?;

        if created {
            info!(table = name, columns = schema.len(), "data frame created");
        }
        Ok(self.table_handle(name, schema))
    }

    /// Look up a previously created table.
    pub async fn open_table(&self, name: &str) -> LoreResult<Option<DataFrameTable>> {
        let owned = name.to_string();
        let schema_json: Option<String> = self
            .pool
            .read(move |conn| {
                conn.query_row(
                    &format!("SELECT schema FROM {CATALOG_TABLE} WHERE name = ?1"),
                    [owned],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| to_storage_err(e.to_string()))
            })
            .await?;
        match schema_json {
            Some(json) => {
                let schema: DataFrameSchema = serde_json::from_str(&json)?;
                Ok(Some(self.table_handle(name, schema)))
            }
            None => Ok(None),
        }
    }

    /// Names of every table, sorted.
    pub async fn table_names(&self) -> LoreResult<Vec<String>> {
        self.pool
            .read(|conn| {
                let mut stmt = conn
                    .prepare(&format!("SELECT name FROM {CATALOG_TABLE} ORDER BY name"))
                    .map_err(|e| to_storage_err(e.to_string()))?;
                let rows = stmt
                    .query_map([], |row| row.get(0))
                    .map_err(|e| to_storage_err(e.to_string()))?;
                rows.collect::<Result<Vec<String>, _>>()
                    .map_err(|e| to_storage_err(e.to_string()))
            })
            .await
    }

    fn table_handle(&self, name: &str, schema: DataFrameSchema) -> DataFrameTable {
        DataFrameTable::new(name, schema, Arc::clone(&self.pool), self.page_size)
    }
}

fn create_table_ddl(name: &str, schema: &DataFrameSchema) -> String {
    let table = quote(name);
    let mut columns = vec![
        format!("{ROW_ID_COLUMN} INTEGER PRIMARY KEY AUTOINCREMENT"),
        format!("{SOURCE_REF_COLUMN} TEXT NOT NULL"),
    ];
    columns.extend(
        schema
            .columns()
            .map(|(col, def)| format!("{} {}", quote(col), def.column_type.sql_type())),
    );
    let mut ddl = format!("CREATE TABLE {table} ({});", columns.join(", "));
    for (col, def) in schema.columns() {
        if def.index {
            ddl.push_str(&format!(
                "\nCREATE INDEX {} ON {table} ({});",
                quote(&format!("idx_{name}_{col}")),
                quote(col)
            ));
        }
    }
    ddl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataFrameColumnDef;

    #[test]
    fn ddl_quotes_columns_and_adds_indexes() {
        let schema = DataFrameSchema::new()
            .column("lat", DataFrameColumnDef::string().indexed())
            .column("n", DataFrameColumnDef::number());
        let ddl = create_table_ddl("geo", &schema);
        assert!(ddl.starts_with(concat!(
            "CREATE TABLE \"geo\" (row_id INTEGER PRIMARY KEY AUTOINCREMENT, ",
            "source_ref TEXT NOT NULL, \"lat\" TEXT, \"n\" REAL);"
        )));
        assert!(ddl.contains("CREATE INDEX \"idx_geo_lat\" ON \"geo\" (\"lat\");"));
        assert!(!ddl.contains("idx_geo_n"));
    }
}
