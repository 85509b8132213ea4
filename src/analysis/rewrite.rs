//! SQL text rewriting: WHERE/LIMIT fragments and filter-predicate merging.
//!
//! These helpers consume the clause spans located by the scanner and splice
//! user-supplied filter predicates into an existing statement without
//! disturbing clause order.

use std::collections::HashMap;

use super::clause_scanner::{
    has_limit_clause, locate_fourth_clause_offset, locate_where_clause_range,
};

/// One user-supplied filter predicate, e.g. `AND name = 'x'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    /// `AND` / `OR`; ignored for the first predicate.
    pub connector: String,
    pub column: String,
    pub operator: String,
    /// Verbatim right-hand side, already quoted by the caller.
    pub value: String,
}

impl FilterPredicate {
    pub fn new(connector: &str, column: &str, operator: &str, value: &str) -> Self {
        Self {
            connector: connector.to_string(),
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        }
    }
}

/// Build a `WHERE` clause equating each column to its value.
///
/// When `snapshot_overrides` carries a pre-change value for a column (a
/// pending edit that has not been committed yet), that value wins over the
/// current one, so the clause identifies the row as stored. Single quotes in
/// values are doubled.
pub fn build_where_clause_from_conditions(
    pairs: &[(String, String)],
    snapshot_overrides: &HashMap<String, String>,
) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let mut clause = String::from("WHERE ");
    for (i, (column, current)) in pairs.iter().enumerate() {
        if i > 0 {
            clause.push_str(" AND ");
        }
        let value = snapshot_overrides.get(column).unwrap_or(current);
        clause.push_str(column);
        clause.push_str(" = '");
        clause.push_str(&value.replace('\'', "''"));
        clause.push('\'');
    }
    clause
}

/// Build a `LIMIT … OFFSET …` clause for 1-based page numbers. Returns an
/// empty string when both inputs are non-positive, meaning "no paging".
pub fn build_limit_offset_clause(page: i64, per_page: i64) -> String {
    if page <= 0 && per_page <= 0 {
        return String::new();
    }
    let per_page = per_page.max(0);
    let offset = (page.max(1) - 1) * per_page;
    format!("LIMIT {} OFFSET {}", per_page, offset)
}

/// Merge filter predicates into a statement without disturbing clause order.
///
/// With an existing `WHERE`, the predicates are appended as a parenthesized
/// `AND (…)`. Without one, a new `WHERE` is spliced immediately before the
/// first `ORDER|GROUP|LIMIT|HAVING|WINDOW` clause, or at the end when the
/// statement has none. When the statement lacked a `LIMIT` and
/// `default_limit > 0`, a first-page limit/offset clause is appended.
pub fn merge_filter_predicates_into_statement(
    sql: &str,
    predicates: &[FilterPredicate],
    default_limit: i64,
) -> String {
    let mut result = sql.trim_end().to_string();

    if !predicates.is_empty() {
        let mut combined = String::new();
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                combined.push(' ');
                combined.push_str(&predicate.connector);
                combined.push(' ');
            }
            combined.push_str(&format!(
                "{} {} {}",
                predicate.column, predicate.operator, predicate.value
            ));
        }

        result = if let Some(range) = locate_where_clause_range(sql) {
            let mut merged = sql[..range.end].trim_end().to_string();
            merged.push_str(&format!(" AND ({})", combined));
            let tail = sql[range.end..].trim();
            if !tail.is_empty() {
                merged.push(' ');
                merged.push_str(tail);
            }
            merged
        } else if let Some(offset) = locate_fourth_clause_offset(sql) {
            format!(
                "{} WHERE {} {}",
                sql[..offset].trim_end(),
                combined,
                sql[offset..].trim_end()
            )
        } else {
            format!("{} WHERE {}", sql.trim_end(), combined)
        };
    }

    if default_limit > 0 && !has_limit_clause(sql) {
        result.push(' ');
        result.push_str(&build_limit_offset_clause(1, default_limit));
    }
    result
}

/// Replace the trailing shard-number suffix of a table name.
///
/// Idempotent: a name already ending in `new_suffix` is returned unchanged;
/// otherwise a trailing run of digits is replaced, or `_<suffix>` appended
/// when the name has no trailing digits.
pub fn rewrite_table_shard_suffix(table_name: &str, new_suffix: &str) -> String {
    if table_name.ends_with(new_suffix) {
        return table_name.to_string();
    }
    let stem = table_name.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.len() < table_name.len() {
        format!("{}{}", stem, new_suffix)
    } else {
        format!("{}_{}", table_name, new_suffix)
    }
}
