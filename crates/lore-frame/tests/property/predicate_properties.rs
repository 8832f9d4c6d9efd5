//! Property tests: AND is intersection, OR is union; bad columns and values
//! fail at compile time.

use std::collections::BTreeSet;

use proptest::prelude::*;

use lore_core::config::FrameConfig;
use lore_core::errors::FrameError;
use lore_core::query::{PropertySearchTerm, SearchTermGroup, Term};
use lore_core::LoreError;
use lore_frame::{
    compile_predicate, DataFrameColumnDef, DataFrameRow, DataFrameSchema, DataFrameSourceRef,
    DataFrameTable, FrameStore,
};

fn schema() -> DataFrameSchema {
    DataFrameSchema::new()
        .column("a", DataFrameColumnDef::number())
        .column("b", DataFrameColumnDef::string())
}

fn prop(name: &str, value: &str) -> Term {
    Term::Property(PropertySearchTerm::new(name, value))
}

async fn ordinals(table: &DataFrameTable, group: SearchTermGroup) -> BTreeSet<u32> {
    table
        .find_sources(&group)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.range.start.message_ordinal)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_and_is_intersection_or_is_union(
        cells in prop::collection::vec((0u8..3, "[xyz]"), 1..12),
        a in 0u8..3,
        b in "[xyz]",
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = FrameStore::open_in_memory(&FrameConfig::default()).await.unwrap();
            let table = store.create_table("t", schema()).await.unwrap();
            let rows: Vec<DataFrameRow> = cells
                .iter()
                .enumerate()
                .map(|(i, (x, y))| {
                    DataFrameRow::new(DataFrameSourceRef::message(i as u32))
                        .with("a", f64::from(*x))
                        .with("b", y.as_str())
                })
                .collect();
            table.add_rows(&rows).await.unwrap();

            let a = a.to_string();
            let only_a = ordinals(&table, SearchTermGroup::and([prop("a", &a)])).await;
            let only_b = ordinals(&table, SearchTermGroup::and([prop("b", &b)])).await;
            let and = ordinals(&table, SearchTermGroup::and([prop("a", &a), prop("b", &b)])).await;
            let or = ordinals(&table, SearchTermGroup::or([prop("a", &a), prop("b", &b)])).await;

            assert_eq!(and, only_a.intersection(&only_b).copied().collect());
            assert_eq!(or, only_a.union(&only_b).copied().collect());
        });
    }

    #[test]
    fn prop_unknown_columns_rejected(column in "[a-z]{2,8}") {
        prop_assume!(!schema().contains(&column));
        let group = SearchTermGroup::and([prop("a", "1"), prop(&column, "1")]);
        let err = compile_predicate(&group, &schema(), "t").unwrap_err();
        let is_unknown = matches!(err, LoreError::Frame(FrameError::UnknownColumn { .. }));
        prop_assert!(is_unknown);
    }

    #[test]
    fn prop_non_numeric_text_is_type_mismatch(value in "[a-zA-Z ]{1,10}") {
        prop_assume!(value.trim().parse::<f64>().is_err());
        let group = SearchTermGroup::or([prop("a", &value)]);
        let err = compile_predicate(&group, &schema(), "t").unwrap_err();
        let is_mismatch = matches!(err, LoreError::Frame(FrameError::TypeMismatch { .. }));
        prop_assert!(is_mismatch);
    }
}
