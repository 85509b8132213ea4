//! Query rewriting through the public API.

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use sqltext::{
    build_limit_offset_clause, build_where_clause_from_conditions, has_limit_clause,
    locate_order_by_clauses, merge_filter_predicates_into_statement, rewrite_table_shard_suffix,
    FilterPredicate,
};

#[test]
fn test_limit_offset_paging() {
    assert_eq!(build_limit_offset_clause(1, 20), "LIMIT 20 OFFSET 0");
    assert_eq!(build_limit_offset_clause(3, 20), "LIMIT 20 OFFSET 40");
    assert_eq!(build_limit_offset_clause(0, 0), "");
}

#[test]
fn test_merge_preserves_order_by() {
    let merged = merge_filter_predicates_into_statement(
        "SELECT * FROM t ORDER BY id",
        &[FilterPredicate::new("AND", "name", "=", "'x'")],
        100,
    );

    // The synthesized WHERE lands before ORDER BY, which stays intact once.
    assert_eq!(
        merged,
        "SELECT * FROM t WHERE name = 'x' ORDER BY id LIMIT 100 OFFSET 0"
    );
    assert_eq!(
        locate_order_by_clauses(&merged),
        vec!["ORDER BY id".to_string()]
    );
    assert!(has_limit_clause(&merged));
}

#[test]
fn test_merge_wraps_existing_where() {
    let merged = merge_filter_predicates_into_statement(
        "SELECT * FROM t WHERE a = 1 GROUP BY a",
        &[FilterPredicate::new("AND", "b", "<>", "2")],
        0,
    );
    assert_eq!(merged, "SELECT * FROM t WHERE a = 1 AND (b <> 2) GROUP BY a");
}

#[test]
fn test_where_clause_uses_snapshot_values() {
    let pairs = vec![
        ("id".to_string(), "7".to_string()),
        ("name".to_string(), "edited".to_string()),
    ];
    let mut overrides = HashMap::new();
    overrides.insert("name".to_string(), "original".to_string());

    assert_eq!(
        build_where_clause_from_conditions(&pairs, &overrides),
        "WHERE id = '7' AND name = 'original'"
    );
}

#[test]
fn test_shard_suffix_round_trip() {
    let renamed = rewrite_table_shard_suffix("orders_3", "7");
    assert_eq!(renamed, "orders_7");
    assert_eq!(rewrite_table_shard_suffix(&renamed, "7"), "orders_7");
}
