use std::collections::BTreeMap;

use pager_core::{
    Condition, ConditionEntry, Join, SearchSpec, SortDir, SortKey, StateSnapshot, TokenV1, Value,
    SEARCH_KEY,
};
use proptest::prelude::*;

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        prop::num::f64::NORMAL.prop_map(Value::Float),
        "[a-z0-9 @._-]{0,16}".prop_map(Value::Str),
    ]
}

fn arb_field() -> impl Strategy<Value = String> {
    "[a-z_]{1,10}\\.[a-z_]{1,10}"
}

fn arb_operator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("="), Just("!="), Just(">"), Just("<="), Just("IN"), Just("LIKE")]
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    (arb_field(), arb_operator(), prop::collection::vec(arb_value(), 1..4))
        .prop_map(|(field, op, values)| Condition::new(field, op, values).expect("non-empty"))
}

fn arb_join() -> impl Strategy<Value = Join> {
    (
        "[a-z_]{1,10}",
        "[a-z_]{1,10}",
        arb_field(),
        prop::collection::vec(arb_condition(), 0..3),
    )
        .prop_map(|(remote_table, remote_key, local_field, conditions)| {
            let mut join = Join::new(remote_table, remote_key, local_field);
            for condition in conditions {
                join.add_condition(condition);
            }
            join
        })
}

fn arb_sort() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        arb_field().prop_map(SortKey::Field),
        "[a-z_]{1,12}".prop_map(SortKey::Computed),
    ]
}

fn arb_search() -> impl Strategy<Value = SearchSpec> {
    ("[a-z0-9 ]{0,20}", prop::collection::vec(arb_field(), 1..4))
        .prop_map(|(query, fields)| SearchSpec { query, fields })
}

fn arb_snapshot() -> impl Strategy<Value = StateSnapshot> {
    (
        "[a-z_]{1,12}",
        prop::collection::btree_map(
            arb_field(),
            prop::collection::vec(arb_condition(), 1..3).prop_map(ConditionEntry::Predicates),
            0..4,
        ),
        prop::option::of(arb_search()),
        prop::collection::vec(arb_join(), 0..3),
        prop::option::of(arb_sort()),
        prop_oneof![Just(SortDir::Asc), Just(SortDir::Desc)],
        1u64..100_000,
    )
        .prop_map(
            |(table, mut conditions, search, joins, sort, direction, page)| {
                if let Some(spec) = search {
                    conditions.insert(SEARCH_KEY.to_string(), ConditionEntry::Search(spec));
                }
                StateSnapshot {
                    table,
                    conditions,
                    joins,
                    sort,
                    direction,
                    page,
                }
            },
        )
}

proptest! {
    // decode(encode(s)) == s for every valid wire snapshot.
    #[test]
    fn token_round_trips(snapshot in arb_snapshot()) {
        let token = TokenV1::from_snapshot(snapshot.clone()).encode();

        // Safe to embed as a single URL query value without escaping.
        prop_assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let decoded = TokenV1::decode(&token).expect("own tokens decode");
        prop_assert_eq!(decoded.into_snapshot(), snapshot);
    }

    // Corrupting a token never panics; it either still decodes or fails
    // with a recoverable error.
    #[test]
    fn corrupted_tokens_fail_cleanly(snapshot in arb_snapshot(), cut in 0usize..40) {
        let token = TokenV1::from_snapshot(snapshot).encode();
        let truncated: String = token.chars().skip(cut).collect();
        let _ = TokenV1::decode(&truncated);
    }
}
