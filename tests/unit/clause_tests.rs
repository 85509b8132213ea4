//! Clause scanning and alias resolution through the public API.

use pretty_assertions::assert_eq;

use sqltext::{
    find_null_predicate_columns, has_limit_clause, is_pragma_statement, is_select_statement,
    locate_order_by_clauses, locate_where_clause, parse_from_clause, TableAlias,
};

// ============================================================================
// Canonical clause extraction
// ============================================================================

#[test]
fn test_canonical_select_clause_extraction() {
    let sql = "SELECT * FROM t WHERE c = 1 ORDER BY c LIMIT 10";

    assert!(is_select_statement(sql));
    assert_eq!(locate_where_clause(sql), Some("WHERE c = 1".to_string()));
    assert_eq!(locate_order_by_clauses(sql), vec!["ORDER BY c".to_string()]);
    assert!(has_limit_clause(sql));
}

#[test]
fn test_clause_extraction_survives_nested_subquery() {
    let sql = "SELECT * FROM (SELECT id FROM u WHERE id > 0 ORDER BY id LIMIT 3) d \
               WHERE d.id < 100";

    assert_eq!(locate_where_clause(sql), Some("WHERE d.id < 100".to_string()));
    assert!(!has_limit_clause(sql));
}

#[test]
fn test_pragma_query_versus_assignment() {
    assert!(is_pragma_statement("PRAGMA index_list('t')", true));
    assert!(is_pragma_statement("PRAGMA synchronous = OFF", false));
    assert!(!is_pragma_statement("PRAGMA synchronous = OFF", true));
}

// ============================================================================
// Alias map building and null-predicate resolution
// ============================================================================

#[test]
fn test_from_clause_join_bindings_ordered() {
    let sql = "FROM customer c LEFT JOIN orders o ON c.id = o.customer_id";
    assert_eq!(
        parse_from_clause(sql),
        vec![
            TableAlias {
                table: "customer".to_string(),
                alias: "c".to_string()
            },
            TableAlias {
                table: "orders".to_string(),
                alias: "o".to_string()
            },
        ]
    );
}

#[test]
fn test_null_predicates_resolved_through_alias_map() {
    let sql = "SELECT * FROM customer c LEFT JOIN orders o ON c.id = o.customer_id \
               WHERE o.shipped_at IS NULL AND c.phone NOTNULL";
    let aliases = parse_from_clause(sql);

    assert_eq!(
        find_null_predicate_columns(sql, &aliases),
        vec![
            ("orders".to_string(), "shipped_at".to_string()),
            ("customer".to_string(), "phone".to_string()),
        ]
    );
}
