//! SQL-text analysis engine.
//!
//! Best-effort structural recovery from single SQL statement strings:
//! clause spans, table/alias bindings, `CREATE TABLE` column and constraint
//! definitions, `CREATE INDEX` shapes, filter-predicate rewriting, and
//! null-predicate column resolution. No AST is built; everything works on
//! paren-balanced character scans and token streams.

mod alias_resolver;
mod clause_scanner;
mod ddl_extractor;
mod index_parser;
mod null_predicates;
mod rewrite;
mod token_scanner;

pub use alias_resolver::{
    parse_from_clause, parse_update_target_clause, resolve_alias_for_table, TableAlias,
};
pub use clause_scanner::{
    has_limit_clause, is_pragma_statement, is_select_statement, locate_fourth_clause,
    locate_order_by_clauses, locate_where_clause,
};
pub use ddl_extractor::{
    classify_definition_line, parse_create_table_columns, parse_create_table_constraints,
    parse_create_table_foreign_keys, split_top_level_definitions, CheckConstraint, ColumnInfo,
    Definition, ForeignKeyConstraint, PrimaryKeyConstraint, TableConstraint, UniqueConstraint,
};
pub use index_parser::{parse_create_index_statement, ForeignKeyInfo, IndexInfo, IndexKind};
pub use null_predicates::find_null_predicate_columns;
pub use rewrite::{
    build_limit_offset_clause, build_where_clause_from_conditions,
    merge_filter_predicates_into_statement, rewrite_table_shard_suffix, FilterPredicate,
};
pub(crate) use token_scanner::TokenScanner;
