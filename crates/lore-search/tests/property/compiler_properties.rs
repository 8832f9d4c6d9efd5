//! Compilation is deterministic and never invents constraints.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use lore_core::query::{
    DateRange, PropertySearchTerm, ScopeHint, SearchExpr, SearchFilter, SearchQuery, SearchTerm,
    SearchTermGroup, Term, TextRange,
};
use lore_search::{compile, CompileOptions, ConversationScope};

fn arb_term() -> impl Strategy<Value = Term> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|t| Term::Search(SearchTerm::new(t))),
        ("(verb|subject|name)", "[a-z]{1,6}")
            .prop_map(|(n, v)| Term::Property(PropertySearchTerm::new(n, v))),
    ]
}

fn arb_scope() -> impl Strategy<Value = Option<ScopeHint>> {
    prop_oneof![
        Just(None),
        (1u32..28, 1u32..28).prop_map(|(a, b)| Some(ScopeHint {
            date_range: Some(DateRange::new(
                Utc.with_ymd_and_hms(2024, 1, a, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, b, 0, 0, 0).unwrap(),
            )),
            text_ranges: Vec::new(),
        })),
        (0u32..20, 0u32..20).prop_map(|(a, len)| Some(ScopeHint {
            date_range: None,
            text_ranges: vec![TextRange::messages(a, a + len + 1)],
        })),
    ]
}

fn arb_filter() -> impl Strategy<Value = SearchFilter> {
    (prop::collection::vec(arb_term(), 0..4), any::<bool>(), arb_scope()).prop_map(
        |(terms, and, scope)| {
            let group = if and {
                SearchTermGroup::and(terms)
            } else {
                SearchTermGroup::or(terms)
            };
            SearchFilter {
                search_terms: group,
                knowledge_type: None,
                scope,
            }
        },
    )
}

fn arb_query() -> impl Strategy<Value = SearchQuery> {
    prop::collection::vec(prop::collection::vec(arb_filter(), 0..3), 1..4).prop_map(|exprs| {
        SearchQuery::new(
            exprs
                .into_iter()
                .enumerate()
                .map(|(i, filters)| SearchExpr::new(format!("q{i}"), filters))
                .collect(),
        )
    })
}

fn conversation() -> ConversationScope {
    ConversationScope {
        date_range: Some(DateRange::new(
            Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap(),
        )),
        message_count: 10,
    }
}

proptest! {
    #[test]
    fn compiling_twice_is_identical(
        query in arb_query(),
        exact in any::<bool>(),
        apply in any::<bool>(),
    ) {
        let options = CompileOptions { exact_scope: exact, apply_scope: apply };
        let first = compile(&query, &options, &conversation());
        let second = compile(&query, &options, &conversation());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn one_select_per_filter_in_order(query in arb_query()) {
        let compiled = compile(&query, &CompileOptions::default(), &conversation());
        prop_assert_eq!(compiled.len(), query.search_expressions.len());
        for (expr, out) in query.search_expressions.iter().zip(&compiled) {
            prop_assert_eq!(expr.filters.len(), out.select_expressions.len());
            for (filter, select) in expr.filters.iter().zip(&out.select_expressions) {
                prop_assert_eq!(&filter.search_terms, &select.search_term_group);
            }
        }
    }

    #[test]
    fn ignoring_scope_leaves_no_when_filter(query in arb_query()) {
        let options = CompileOptions { exact_scope: true, apply_scope: false };
        for out in compile(&query, &options, &conversation()) {
            for select in out.select_expressions {
                prop_assert!(select.when.is_none());
            }
        }
    }

    #[test]
    fn relaxed_ordinal_scope_stays_inside_the_conversation(query in arb_query()) {
        let options = CompileOptions { exact_scope: false, apply_scope: true };
        for out in compile(&query, &options, &conversation()) {
            for select in out.select_expressions {
                let ranges = select.when.and_then(|w| w.text_ranges_in_scope).unwrap_or_default();
                for range in ranges {
                    prop_assert!(range.message_ordinals().iter().all(|o| *o < 10));
                }
            }
        }
    }
}
