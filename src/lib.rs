//! sqltext: structural analysis of raw SQL statement text
//!
//! This library recovers structure (clause boundaries, table/alias bindings,
//! column and constraint definitions) from single SQL statement strings using
//! paren-balanced scanning and token matching, without building an AST. It is
//! aimed at SQLite-oriented front-ends that drive autocomplete, query
//! rewriting, and schema introspection from literal SQL text.
//!
//! Every entry point is a pure function over `&str`. Malformed or
//! unrecognized input never raises; absence (`None`, an empty `Vec`, an
//! empty `String`) is the only failure signal.

pub mod analysis;
pub mod util;

pub use analysis::{
    build_limit_offset_clause, build_where_clause_from_conditions, classify_definition_line,
    find_null_predicate_columns, has_limit_clause, is_pragma_statement, is_select_statement,
    locate_fourth_clause, locate_order_by_clauses, locate_where_clause,
    merge_filter_predicates_into_statement, parse_create_index_statement,
    parse_create_table_columns, parse_create_table_constraints, parse_create_table_foreign_keys,
    parse_from_clause, parse_update_target_clause, resolve_alias_for_table,
    rewrite_table_shard_suffix, split_top_level_definitions, CheckConstraint, ColumnInfo,
    Definition, FilterPredicate, ForeignKeyConstraint, ForeignKeyInfo, IndexInfo, IndexKind,
    PrimaryKeyConstraint, TableAlias, TableConstraint, UniqueConstraint,
};
