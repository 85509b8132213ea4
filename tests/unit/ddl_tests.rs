//! DDL extraction through the public API.

use pretty_assertions::assert_eq;

use sqltext::{
    parse_create_index_statement, parse_create_table_columns, parse_create_table_constraints,
    parse_create_table_foreign_keys, split_top_level_definitions, IndexKind,
};

// ============================================================================
// CREATE TABLE scenario from real sqlite_master text
// ============================================================================

const AUTOINC_DDL: &str =
    "CREATE TABLE t (\"id\" INTEGER NOT NULL, \"name\" TEXT, PRIMARY KEY(\"id\" AUTOINCREMENT))";

#[test]
fn test_autoincrement_table_columns() {
    let columns = parse_create_table_columns(AUTOINC_DDL);
    assert_eq!(columns.len(), 2);

    assert_eq!(columns[0].name, "id");
    assert_eq!(columns[0].declared_type, "INTEGER");
    assert!(!columns[0].is_nullable);

    assert_eq!(columns[1].name, "name");
    assert!(columns[1].is_nullable);
}

#[test]
fn test_autoincrement_table_primary_key() {
    let constraints = parse_create_table_constraints(AUTOINC_DDL);
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].kind, IndexKind::PrimaryKey);
    assert_eq!(constraints[0].columns, vec!["id".to_string()]);
    assert!(constraints[0].is_autoincrement);
    assert!(constraints[0].is_primary_key);
}

#[test]
fn test_default_expression_commas_do_not_split() {
    let body = "id INTEGER PRIMARY KEY, \
                created TEXT DEFAULT (strftime('%Y-%m-%d', 'now')), \
                flag INT DEFAULT 0";
    let lines = split_top_level_definitions(body);
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "created TEXT DEFAULT (strftime('%Y-%m-%d', 'now'))"
    );

    let sql = format!("CREATE TABLE t ({})", body);
    let columns = parse_create_table_columns(&sql);
    assert_eq!(columns.len(), 3);
    assert_eq!(
        columns[1].default_value.as_deref(),
        Some("(strftime('%Y-%m-%d', 'now'))")
    );
}

#[test]
fn test_full_schema_extraction() {
    let sql = "CREATE TABLE orders (\
               id INTEGER PRIMARY KEY AUTOINCREMENT, \
               customer_id INTEGER NOT NULL, \
               total DECIMAL(10,2) DEFAULT 0, \
               note TEXT UNIQUE, \
               CHECK (total >= 0), \
               CONSTRAINT fk_customer FOREIGN KEY (customer_id) \
               REFERENCES customer (id) ON DELETE SET NULL ON UPDATE CASCADE)";

    let columns = parse_create_table_columns(sql);
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[2].declared_type, "DECIMAL(10,2)");

    let constraints = parse_create_table_constraints(sql);
    let kinds: Vec<IndexKind> = constraints.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![IndexKind::PrimaryKey, IndexKind::Unique, IndexKind::Check]
    );

    let keys = parse_create_table_foreign_keys(sql);
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].name, "fk_customer");
    assert_eq!(keys[0].columns, vec!["customer_id".to_string()]);
    assert_eq!(keys[0].referenced_table, "customer");
    assert_eq!(keys[0].referenced_columns, vec!["id".to_string()]);
    assert_eq!(keys[0].on_delete_action.as_deref(), Some("SET NULL"));
    assert_eq!(keys[0].on_update_action.as_deref(), Some("CASCADE"));
}

// ============================================================================
// CREATE INDEX statements
// ============================================================================

#[test]
fn test_partial_unique_index() {
    let info =
        parse_create_index_statement("CREATE UNIQUE INDEX idx1 ON t (a, b) WHERE a IS NOT NULL")
            .unwrap();
    assert_eq!(info.name, "idx1");
    assert_eq!(info.table, "t");
    assert_eq!(info.columns, vec!["a".to_string(), "b".to_string()]);
    assert!(info.is_unique);
    assert_eq!(info.partial_clause.as_deref(), Some("WHERE a IS NOT NULL"));
}

#[test]
fn test_non_index_statement_is_absent() {
    assert!(parse_create_index_statement(AUTOINC_DDL).is_none());
}
