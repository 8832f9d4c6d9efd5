//! Property tests: equivalence under reordering, merge preserves operators.

use proptest::prelude::*;

use lore_core::query::{BooleanOp, PropertySearchTerm, SearchTerm, SearchTermGroup, Term};

fn leaf() -> impl Strategy<Value = Term> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|s| Term::Search(SearchTerm::new(s))),
        ("(verb|subject|topic)", "[a-z]{1,6}")
            .prop_map(|(n, v)| Term::Property(PropertySearchTerm::new(n, v))),
    ]
}

fn op() -> impl Strategy<Value = BooleanOp> {
    prop_oneof![Just(BooleanOp::And), Just(BooleanOp::Or), Just(BooleanOp::OrMax)]
}

fn group() -> impl Strategy<Value = SearchTermGroup> {
    let flat = (op(), prop::collection::vec(leaf(), 0..5))
        .prop_map(|(op, terms)| SearchTermGroup::with_terms(op, terms));
    flat.prop_recursive(3, 24, 4, |inner| {
        (op(), prop::collection::vec(prop_oneof![leaf(), inner.prop_map(Term::Group)], 0..4))
            .prop_map(|(op, terms)| SearchTermGroup::with_terms(op, terms))
    })
}

proptest! {
    #[test]
    fn prop_reversed_children_are_equivalent(g in group()) {
        let mut reversed = g.clone();
        reversed.terms.reverse();
        prop_assert!(g.is_equivalent(&reversed));
    }

    #[test]
    fn prop_equivalence_is_reflexive_and_symmetric(a in group(), b in group()) {
        prop_assert!(a.is_equivalent(&a));
        prop_assert_eq!(a.is_equivalent(&b), b.is_equivalent(&a));
    }

    #[test]
    fn prop_merge_uses_requested_operator(a in group(), b in group(), merge_op in op()) {
        let merged = SearchTermGroup::merge(a.clone(), b.clone(), merge_op);
        prop_assert_eq!(merged.boolean_op, merge_op);
        // Every operand with a different operator survives as a nested group.
        for operand in [&a, &b] {
            if !operand.is_empty() && operand.boolean_op != merge_op {
                prop_assert!(merged.terms.contains(&Term::Group(operand.clone())));
            }
        }
    }

    #[test]
    fn prop_merge_preserves_leaf_count(a in group(), b in group(), merge_op in op()) {
        let merged = SearchTermGroup::merge(a.clone(), b.clone(), merge_op);
        prop_assert_eq!(
            merged.all_search_terms().len(),
            a.all_search_terms().len() + b.all_search_terms().len()
        );
    }
}
