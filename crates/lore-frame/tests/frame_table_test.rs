//! DataFrameTable behavior against an in-memory store.

use std::sync::{mpsc, Arc};
use std::time::Duration;

use lore_core::config::FrameConfig;
use lore_core::errors::FrameError;
use lore_core::query::{ComparisonOp, PropertySearchTerm, SearchTermGroup, Term, TextRange};
use lore_core::LoreError;
use lore_frame::{
    DataFrameColumnDef, DataFrameRow, DataFrameSchema, DataFrameSourceRef, DataFrameTable,
    DataFrameValue, FrameStore,
};

fn prop(name: &str, value: &str) -> Term {
    Term::Property(PropertySearchTerm::new(name, value))
}

fn purchases_schema() -> DataFrameSchema {
    DataFrameSchema::new()
        .column("item", DataFrameColumnDef::string().indexed())
        .column("price", DataFrameColumnDef::number())
}

async fn purchases() -> (FrameStore, DataFrameTable) {
    let store = FrameStore::open_in_memory(&FrameConfig::default()).await.unwrap();
    let table = store.create_table("purchases", purchases_schema()).await.unwrap();
    table
        .add_rows(&[
            DataFrameRow::new(DataFrameSourceRef::message(0))
                .with("item", "book")
                .with("price", 12.0),
            DataFrameRow::new(DataFrameSourceRef::message(1))
                .with("item", "lamp")
                .with("price", 40.0),
            DataFrameRow::new(DataFrameSourceRef::message(2))
                .with("item", "book")
                .with("price", 8.5),
            // No price: NULL.
            DataFrameRow::new(DataFrameSourceRef::message(3)).with("item", "gift"),
        ])
        .await
        .unwrap();
    (store, table)
}

fn message_ordinals(sources: &[DataFrameSourceRef]) -> Vec<u32> {
    let mut ordinals: Vec<u32> = sources.iter().map(|s| s.range.start.message_ordinal).collect();
    ordinals.sort_unstable();
    ordinals
}

// ── Writes ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_rows_and_count() {
    let (_store, table) = purchases().await;
    assert_eq!(table.row_count().await.unwrap(), 4);
}

#[tokio::test]
async fn bad_row_rejects_whole_batch() {
    let (_store, table) = purchases().await;
    let err = table
        .add_rows(&[
            DataFrameRow::new(DataFrameSourceRef::message(9))
                .with("item", "pen")
                .with("price", 1.0),
            DataFrameRow::new(DataFrameSourceRef::message(10))
                .with("item", "pen")
                .with("price", "cheap"),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, LoreError::Frame(FrameError::TypeMismatch { .. })));
    assert_eq!(table.row_count().await.unwrap(), 4);
}

#[tokio::test]
async fn unknown_record_column_rejected() {
    let (_store, table) = purchases().await;
    let err = table
        .add_rows(&[DataFrameRow::new(DataFrameSourceRef::message(9)).with("colour", "red")])
        .await
        .unwrap_err();
    assert!(matches!(err, LoreError::Frame(FrameError::UnknownColumn { .. })));
}

#[tokio::test]
async fn numeric_strings_coerce_into_number_columns() {
    let (_store, table) = purchases().await;
    table
        .add_rows(&[DataFrameRow::new(DataFrameSourceRef::message(5))
            .with("item", "mug")
            .with("price", "3.25")])
        .await
        .unwrap();
    let rows = table.get_row("item", "mug", ComparisonOp::Eq).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("price"), Some(&DataFrameValue::Number(3.25)));
}

// ── Point lookups ─────────────────────────────────────────────────────────

#[tokio::test]
async fn get_row_returns_matches_in_insertion_order() {
    let (_store, table) = purchases().await;
    let rows = table.get_row("item", "book", ComparisonOp::Eq).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].source_ref, DataFrameSourceRef::message(0));
    assert_eq!(rows[1].source_ref, DataFrameSourceRef::message(2));
}

#[tokio::test]
async fn get_row_with_no_match_is_empty_not_error() {
    let (_store, table) = purchases().await;
    assert!(table.get_row("item", "piano", ComparisonOp::Eq).await.unwrap().is_empty());
}

#[tokio::test]
async fn numeric_comparisons() {
    let (_store, table) = purchases().await;
    let cheap = table.get_row("price", "12", ComparisonOp::Le).await.unwrap();
    assert_eq!(cheap.len(), 2);
    let pricey = table.get_row("price", "12", ComparisonOp::Gt).await.unwrap();
    assert_eq!(pricey.len(), 1);
    assert_eq!(pricey[0].get("item"), Some(&DataFrameValue::String("lamp".into())));
}

// ── Compile-time errors ───────────────────────────────────────────────────

#[tokio::test]
async fn unknown_column_fails_before_execution() {
    let (_store, table) = purchases().await;
    let err = table
        .find_sources(&SearchTermGroup::and([prop("altitude", "10")]))
        .await
        .unwrap_err();
    match err {
        LoreError::Frame(FrameError::UnknownColumn { table, column }) => {
            assert_eq!(table, "purchases");
            assert_eq!(column, "altitude");
        }
        other => panic!("expected UnknownColumn, got {other:?}"),
    }
}

#[tokio::test]
async fn non_numeric_value_for_number_column_is_type_mismatch() {
    let (_store, table) = purchases().await;
    let err = table.get_row("price", "twelve", ComparisonOp::Eq).await.unwrap_err();
    assert!(matches!(err, LoreError::Frame(FrameError::TypeMismatch { .. })));
}

// ── Boolean composition ───────────────────────────────────────────────────

#[tokio::test]
async fn and_intersects_or_unions() {
    let (_store, table) = purchases().await;
    let and = SearchTermGroup::and([prop("item", "book"), prop("price", "12")]);
    assert_eq!(message_ordinals(&table.find_sources(&and).await.unwrap()), vec![0]);

    let or = SearchTermGroup::or([prop("item", "lamp"), prop("price", "8.5")]);
    assert_eq!(message_ordinals(&table.find_sources(&or).await.unwrap()), vec![1, 2]);
}

#[tokio::test]
async fn find_sources_deduplicates() {
    let store = FrameStore::open_in_memory(&FrameConfig::default()).await.unwrap();
    let table = store.create_table("t", purchases_schema()).await.unwrap();
    let shared = DataFrameSourceRef::new(TextRange::messages(4, 6));
    table
        .add_rows(&[
            DataFrameRow::new(shared.clone()).with("item", "book"),
            DataFrameRow::new(shared.clone()).with("item", "book"),
        ])
        .await
        .unwrap();
    let sources = table.find_sources(&SearchTermGroup::and([prop("item", "book")])).await.unwrap();
    assert_eq!(sources, vec![shared]);
}

// ── NULL semantics: a NULL column matches neither = nor != ────────────────

#[tokio::test]
async fn null_matches_neither_equal_nor_not_equal() {
    let (_store, table) = purchases().await;
    let eq = table.get_row("price", "40", ComparisonOp::Eq).await.unwrap();
    let ne = table.get_row("price", "40", ComparisonOp::Ne).await.unwrap();
    assert_eq!(eq.len() + ne.len(), 3, "the NULL-priced row is in neither set");
    let gift = DataFrameValue::String("gift".into());
    assert!(eq.iter().chain(ne.iter()).all(|r| r.get("item") != Some(&gift)));
}

#[tokio::test]
async fn null_cells_read_back_as_null() {
    let (_store, table) = purchases().await;
    let rows = table.get_row("item", "gift", ComparisonOp::Eq).await.unwrap();
    assert_eq!(rows[0].get("price"), Some(&DataFrameValue::Null));
}

// ── Enumeration ───────────────────────────────────────────────────────────

#[tokio::test]
async fn cursor_is_lazy_paged_and_restartable() {
    let config = FrameConfig {
        cursor_page_size: 3,
        ..FrameConfig::default()
    };
    let store = FrameStore::open_in_memory(&config).await.unwrap();
    let table = store.create_table("t", purchases_schema()).await.unwrap();
    let rows: Vec<DataFrameRow> = (0..10)
        .map(|i| {
            DataFrameRow::new(DataFrameSourceRef::message(i))
                .with("item", format!("item{i}"))
                .with("price", f64::from(i))
        })
        .collect();
    table.add_rows(&rows).await.unwrap();

    let first = table.rows();
    let second = table.rows();
    let (a, b) = tokio::task::spawn_blocking(move || {
        let a: Vec<DataFrameRow> = first.collect::<Result<_, _>>().unwrap();
        let b: Vec<DataFrameRow> = second.take(4).collect::<Result<_, _>>().unwrap();
        (a, b)
    })
    .await
    .unwrap();

    assert_eq!(a, rows);
    assert_eq!(b, rows[..4].to_vec());
}

#[tokio::test]
async fn cursor_picks_up_rows_appended_before_its_end() {
    let config = FrameConfig {
        cursor_page_size: 3,
        ..FrameConfig::default()
    };
    let store = FrameStore::open_in_memory(&config).await.unwrap();
    let table = store.create_table("t", purchases_schema()).await.unwrap();
    let row = |i: u32| {
        DataFrameRow::new(DataFrameSourceRef::message(i))
            .with("item", format!("item{i}"))
            .with("price", f64::from(i))
    };
    table.add_rows(&(0..4).map(row).collect::<Vec<_>>()).await.unwrap();

    // Pages of 3 then 1: the short page does not end the cursor.
    let mut cursor = table.rows();
    let (cursor, seen) = tokio::task::spawn_blocking(move || {
        let seen: Vec<DataFrameRow> = cursor.by_ref().take(4).collect::<Result<_, _>>().unwrap();
        (cursor, seen)
    })
    .await
    .unwrap();
    assert_eq!(seen.len(), 4);

    table.add_rows(&[row(4)]).await.unwrap();
    let rest = tokio::task::spawn_blocking(move || cursor.collect::<Result<Vec<_>, _>>().unwrap())
        .await
        .unwrap();
    assert_eq!(rest, vec![row(4)]);
}

#[tokio::test]
async fn empty_table_enumerates_nothing() {
    let store = FrameStore::open_in_memory(&FrameConfig::default()).await.unwrap();
    let table = store.create_table("t", purchases_schema()).await.unwrap();
    let cursor = table.rows();
    let count = tokio::task::spawn_blocking(move || cursor.count()).await.unwrap();
    assert_eq!(count, 0);
}

// ── Catalog ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_table_is_idempotent_for_same_schema() {
    let (store, _table) = purchases().await;
    let again = store.create_table("purchases", purchases_schema()).await.unwrap();
    assert_eq!(again.row_count().await.unwrap(), 4);

    let clash = DataFrameSchema::new().column("item", DataFrameColumnDef::number());
    assert!(store.create_table("purchases", clash).await.is_err());
}

#[tokio::test]
async fn invalid_table_names_rejected() {
    let store = FrameStore::open_in_memory(&FrameConfig::default()).await.unwrap();
    for name in ["bad name", "x;DROP", "_lore_frames"] {
        let err = store.create_table(name, purchases_schema()).await.unwrap_err();
        assert!(matches!(err, LoreError::Frame(FrameError::InvalidIdentifier { .. })), "{name}");
    }
}

// ── Isolation ─────────────────────────────────────────────────────────────

fn storage(e: rusqlite::Error) -> LoreError {
    LoreError::Frame(FrameError::Storage { message: e.to_string() })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn in_memory_readers_never_see_an_open_write_transaction() {
    let (store, table) = purchases().await;
    let pool = Arc::clone(store.pool());
    let (sender, counts) = mpsc::channel();

    let reader = pool
        .writer
        .with_conn(|conn| {
            let tx = conn.unchecked_transaction().map_err(storage)?;
            tx.execute(
                "INSERT INTO \"purchases\" (source_ref, \"item\") VALUES ('{}', 'pending')",
                [],
            )
            .map_err(storage)?;

            let readers = Arc::clone(&pool.readers);
            let reader = std::thread::spawn(move || {
                let count = readers.with_conn(|c| {
                    c.query_row("SELECT COUNT(*) FROM \"purchases\"", [], |r| r.get::<_, i64>(0))
                        .map_err(storage)
                });
                let _ = sender.send(count);
            });
            // The reader waits while the transaction is open.
            assert!(counts.recv_timeout(Duration::from_millis(100)).is_err());
            drop(tx);
            Ok(reader)
        })
        .await
        .unwrap();

    reader.join().unwrap();
    assert_eq!(counts.recv().unwrap().unwrap(), 4);
    assert_eq!(table.row_count().await.unwrap(), 4);
}

#[tokio::test]
async fn in_memory_stores_are_isolated() {
    let (_a, _table) = purchases().await;
    let b = FrameStore::open_in_memory(&FrameConfig::default()).await.unwrap();
    assert!(b.table_names().await.unwrap().is_empty());
}
