//! Clause-boundary scanning over raw statement text.
//!
//! Everything here works on a single paren-balance-aware character scan:
//! keyword matches are only reported when they occur outside string
//! literals and quoted identifiers, with the paren nesting depth attached,
//! so clause boundaries never land inside a subquery, a function call, or a
//! `CASE` expression. Statement-shape checks (`SELECT`/`PRAGMA`) use
//! process-wide compiled patterns.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::util::{contains_ci, starts_with_ci};

/// `SELECT …` or `EXPLAIN [QUERY PLAN] …` statement head.
static SELECT_HEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*(?:SELECT|EXPLAIN(?:\s+QUERY\s+PLAN)?)\b").unwrap());

/// `WITH …` statement head (must still contain a SELECT to count).
static WITH_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)^\s*WITH\b").unwrap());

/// Clause keywords that terminate a `FROM`/`WHERE` span.
const CLAUSE_TERMINATORS: [&str; 5] = ["ORDER", "GROUP", "LIMIT", "HAVING", "WINDOW"];

/// One scannable item found outside string literals and quoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scanned<'a> {
    /// A bare word with the paren depth it occurs at.
    Word {
        offset: usize,
        depth: i32,
        text: &'a str,
    },
    /// A punctuation byte. For `(` and `)` the depth is that of the
    /// *enclosing* scope, so a matching pair reports the same depth.
    Symbol { offset: usize, depth: i32, byte: u8 },
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Single pass over a statement, reporting words and punctuation with their
/// paren depth. Content of `'…'`, `"…"`, `` `…` `` and `[…]` is skipped;
/// `''` inside a string literal is an escaped quote, not a terminator.
pub(crate) fn scan_statement<'a>(sql: &'a str, mut visit: impl FnMut(Scanned<'a>)) {
    let bytes = sql.as_bytes();
    let mut depth: i32 = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == q {
                        if q == b'\'' && bytes.get(i + 1) == Some(&b'\'') {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'[' => {
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
                i += 1;
            }
            b'(' => {
                visit(Scanned::Symbol {
                    offset: i,
                    depth,
                    byte: b'(',
                });
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                visit(Scanned::Symbol {
                    offset: i,
                    depth,
                    byte: b')',
                });
                i += 1;
            }
            b if is_word_byte(b) => {
                let start = i;
                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }
                visit(Scanned::Word {
                    offset: start,
                    depth,
                    text: &sql[start..i],
                });
            }
            b => {
                if !b.is_ascii_whitespace() {
                    visit(Scanned::Symbol {
                        offset: i,
                        depth,
                        byte: b,
                    });
                }
                i += 1;
            }
        }
    }
}

/// All word occurrences matching any of `keywords`, in source order.
pub(crate) fn find_keywords(sql: &str, keywords: &[&str]) -> Vec<(usize, i32, usize)> {
    let mut hits = Vec::new();
    scan_statement(sql, |item| {
        if let Scanned::Word {
            offset,
            depth,
            text,
        } = item
        {
            if let Some(idx) = keywords.iter().position(|k| text.eq_ignore_ascii_case(k)) {
                hits.push((offset, depth, idx));
            }
        }
    });
    hits
}

/// Byte offset of the first top-level occurrence of any of `keywords` at or
/// after `start`.
pub(crate) fn find_top_level_keyword(
    sql: &str,
    start: usize,
    keywords: &[&str],
) -> Option<(usize, usize)> {
    find_keywords(sql, keywords)
        .into_iter()
        .find(|&(offset, depth, _)| depth == 0 && offset >= start)
        .map(|(offset, _, idx)| (offset, idx))
}

/// True for `SELECT …`, `WITH … SELECT …` and `EXPLAIN [QUERY PLAN] …`
/// statements — the shapes that produce a result grid.
pub fn is_select_statement(sql: &str) -> bool {
    if SELECT_HEAD_RE.is_match(sql) {
        return true;
    }
    WITH_HEAD_RE.is_match(sql) && contains_ci(sql, "SELECT")
}

/// True when the statement starts with `PRAGMA`. With `exclude_assignment`
/// set, pragma assignments (a top-level `=`) are rejected so only pragma
/// queries pass.
pub fn is_pragma_statement(sql: &str, exclude_assignment: bool) -> bool {
    let trimmed = sql.trim_start();
    if !starts_with_ci(trimmed, "PRAGMA") {
        return false;
    }
    // Boundary check: "PRAGMAS" is not a pragma.
    if trimmed
        .as_bytes()
        .get("PRAGMA".len())
        .is_some_and(|&b| is_word_byte(b))
    {
        return false;
    }
    if !exclude_assignment {
        return true;
    }

    let mut has_assignment = false;
    scan_statement(sql, |item| {
        if let Scanned::Symbol { depth: 0, byte, .. } = item {
            if byte == b'=' {
                has_assignment = true;
            }
        }
    });
    !has_assignment
}

/// Byte range of the `WHERE …` clause span, when one exists.
///
/// Strict pass: the span between the first top-level `FROM` and the next
/// top-level clause terminator is narrowed and searched for a top-level
/// `WHERE`. Loose fallback: the last top-level `WHERE` anywhere in the
/// statement, terminated the same way.
pub(crate) fn locate_where_clause_range(sql: &str) -> Option<Range<usize>> {
    let hits = find_keywords(
        sql,
        &["FROM", "WHERE", "ORDER", "GROUP", "LIMIT", "HAVING", "WINDOW"],
    );
    let top_level = |hit: &&(usize, i32, usize)| hit.1 == 0;

    if let Some(&(from_offset, _, _)) = hits.iter().filter(top_level).find(|&&(_, _, idx)| idx == 0)
    {
        let span_end = hits
            .iter()
            .filter(top_level)
            .find(|&&(offset, _, idx)| offset > from_offset && idx >= 2)
            .map(|&(offset, _, _)| offset)
            .unwrap_or(sql.len());
        if let Some(&(where_offset, _, _)) = hits
            .iter()
            .filter(top_level)
            .find(|&&(offset, _, idx)| idx == 1 && offset > from_offset && offset < span_end)
        {
            return Some(where_offset..span_end);
        }
    }

    // Loose fallback: last top-level WHERE to the next terminator or end.
    let &(where_offset, _, _) = hits
        .iter()
        .filter(top_level)
        .filter(|&&(_, _, idx)| idx == 1)
        .last()?;
    let span_end = hits
        .iter()
        .filter(top_level)
        .find(|&&(offset, _, idx)| offset > where_offset && idx >= 2)
        .map(|&(offset, _, _)| offset)
        .unwrap_or(sql.len());
    Some(where_offset..span_end)
}

/// The `WHERE …` clause span of a statement, or `None` when it has none.
pub fn locate_where_clause(sql: &str) -> Option<String> {
    locate_where_clause_range(sql).map(|range| sql[range].trim().to_string())
}

/// Every `ORDER BY …` span in the statement, in source order. Each span ends
/// at a same-depth `LIMIT`/`OFFSET`, at the closing paren of the group the
/// span started in, or at the end of the statement.
pub fn locate_order_by_clauses(sql: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut close_parens = Vec::new();
    scan_statement(sql, |item| match item {
        Scanned::Word {
            offset,
            depth,
            text,
        } => words.push((offset, depth, text)),
        Scanned::Symbol {
            offset,
            depth,
            byte: b')',
        } => close_parens.push((offset, depth)),
        _ => {}
    });

    let mut spans = Vec::new();
    for (i, &(offset, depth, text)) in words.iter().enumerate() {
        if !text.eq_ignore_ascii_case("ORDER") {
            continue;
        }
        let followed_by_by = words
            .get(i + 1)
            .is_some_and(|&(_, d, t)| d == depth && t.eq_ignore_ascii_case("BY"));
        if !followed_by_by {
            continue;
        }

        let keyword_end = words
            .iter()
            .skip(i + 2)
            .find(|&&(o, d, t)| {
                o > offset
                    && d == depth
                    && (t.eq_ignore_ascii_case("LIMIT") || t.eq_ignore_ascii_case("OFFSET"))
            })
            .map(|&(o, _, _)| o);
        let paren_end = close_parens
            .iter()
            .find(|&&(o, d)| o > offset && d < depth)
            .map(|&(o, _)| o);

        let end = match (keyword_end, paren_end) {
            (Some(k), Some(p)) => k.min(p),
            (Some(k), None) => k,
            (None, Some(p)) => p,
            (None, None) => sql.len(),
        };
        spans.push(sql[offset..end].trim().to_string());
    }
    spans
}

/// Byte offset of the first top-level `ORDER|GROUP|LIMIT|HAVING|WINDOW`.
pub(crate) fn locate_fourth_clause_offset(sql: &str) -> Option<usize> {
    find_top_level_keyword(sql, 0, &CLAUSE_TERMINATORS).map(|(offset, _)| offset)
}

/// The first top-level `ORDER|GROUP|LIMIT|HAVING|WINDOW …` span, used as the
/// splice anchor when rewriting statements.
pub fn locate_fourth_clause(sql: &str) -> Option<String> {
    locate_fourth_clause_offset(sql).map(|offset| sql[offset..].trim().to_string())
}

/// True when the statement carries a top-level `LIMIT` clause.
pub fn has_limit_clause(sql: &str) -> bool {
    find_top_level_keyword(sql, 0, &["LIMIT"]).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Statement shape tests
    // ========================================================================

    #[test]
    fn test_is_select_plain() {
        assert!(is_select_statement("SELECT * FROM t"));
        assert!(is_select_statement("  select 1"));
    }

    #[test]
    fn test_is_select_with_cte() {
        assert!(is_select_statement(
            "WITH x AS (SELECT 1 AS v) SELECT v FROM x"
        ));
        assert!(!is_select_statement("WITH x AS (VALUES (1)) DELETE FROM t"));
    }

    #[test]
    fn test_is_select_explain() {
        assert!(is_select_statement("EXPLAIN SELECT 1"));
        assert!(is_select_statement("EXPLAIN QUERY PLAN SELECT * FROM t"));
    }

    #[test]
    fn test_is_select_rejects_dml() {
        assert!(!is_select_statement("UPDATE t SET a = 1"));
        assert!(!is_select_statement("INSERT INTO t SELECT * FROM s"));
    }

    #[test]
    fn test_is_pragma() {
        assert!(is_pragma_statement("PRAGMA table_info(t)", false));
        assert!(is_pragma_statement("pragma journal_mode", false));
        assert!(!is_pragma_statement("SELECT 1", false));
        assert!(!is_pragma_statement("PRAGMAS", false));
    }

    #[test]
    fn test_is_pragma_exclude_assignment() {
        assert!(is_pragma_statement("PRAGMA cache_size", true));
        assert!(!is_pragma_statement("PRAGMA cache_size = 2000", true));
        // The '=' inside the argument list is not top-level.
        assert!(is_pragma_statement("PRAGMA wal_checkpoint(TRUNCATE)", true));
    }

    // ========================================================================
    // WHERE clause location
    // ========================================================================

    #[test]
    fn test_where_basic() {
        let sql = "SELECT * FROM t WHERE c = 1 ORDER BY c LIMIT 10";
        assert_eq!(locate_where_clause(sql), Some("WHERE c = 1".to_string()));
    }

    #[test]
    fn test_where_runs_to_end() {
        let sql = "SELECT * FROM t WHERE a = 1 AND b = 2";
        assert_eq!(
            locate_where_clause(sql),
            Some("WHERE a = 1 AND b = 2".to_string())
        );
    }

    #[test]
    fn test_where_ignores_subquery_clauses() {
        let sql = "SELECT * FROM (SELECT * FROM u WHERE x = 1 GROUP BY x) d WHERE d.x > 0 ORDER BY 1";
        assert_eq!(locate_where_clause(sql), Some("WHERE d.x > 0".to_string()));
    }

    #[test]
    fn test_where_absent() {
        assert_eq!(locate_where_clause("SELECT * FROM t"), None);
        assert_eq!(locate_where_clause("SELECT 1"), None);
    }

    #[test]
    fn test_where_loose_fallback_without_from() {
        // DELETE has no FROM-span to anchor on; the loose pass still finds it.
        let sql = "UPDATE t SET a = 1 WHERE id = 3";
        assert_eq!(locate_where_clause(sql), Some("WHERE id = 3".to_string()));
    }

    #[test]
    fn test_where_keyword_inside_string_ignored() {
        let sql = "SELECT * FROM t WHERE name = 'WHERE ORDER BY'";
        assert_eq!(
            locate_where_clause(sql),
            Some("WHERE name = 'WHERE ORDER BY'".to_string())
        );
    }

    // ========================================================================
    // ORDER BY spans
    // ========================================================================

    #[test]
    fn test_order_by_basic() {
        let sql = "SELECT * FROM t WHERE c = 1 ORDER BY c LIMIT 10";
        assert_eq!(locate_order_by_clauses(sql), vec!["ORDER BY c"]);
    }

    #[test]
    fn test_order_by_multiple_branches() {
        let sql = "SELECT a FROM t ORDER BY a LIMIT 5 OFFSET 2";
        assert_eq!(locate_order_by_clauses(sql), vec!["ORDER BY a"]);

        let compound = "(SELECT a FROM t ORDER BY a) UNION ALL SELECT b FROM u ORDER BY b";
        assert_eq!(
            locate_order_by_clauses(compound),
            vec!["ORDER BY a", "ORDER BY b"]
        );
    }

    #[test]
    fn test_order_by_terminated_by_closing_paren() {
        let sql = "SELECT * FROM (SELECT a FROM t ORDER BY a DESC) d";
        assert_eq!(locate_order_by_clauses(sql), vec!["ORDER BY a DESC"]);
    }

    #[test]
    fn test_order_without_by_ignored() {
        let sql = "SELECT \"order\" FROM orders";
        assert!(locate_order_by_clauses(sql).is_empty());
    }

    // ========================================================================
    // Fourth clause and LIMIT
    // ========================================================================

    #[test]
    fn test_fourth_clause_first_of_set() {
        let sql = "SELECT a FROM t GROUP BY a HAVING count(*) > 1 ORDER BY a";
        assert_eq!(
            locate_fourth_clause(sql),
            Some("GROUP BY a HAVING count(*) > 1 ORDER BY a".to_string())
        );
    }

    #[test]
    fn test_fourth_clause_absent() {
        assert_eq!(locate_fourth_clause("SELECT a FROM t WHERE a = 1"), None);
    }

    #[test]
    fn test_fourth_clause_not_in_subquery() {
        let sql = "SELECT * FROM (SELECT a FROM t GROUP BY a) d LIMIT 3";
        assert_eq!(locate_fourth_clause(sql), Some("LIMIT 3".to_string()));
    }

    #[test]
    fn test_has_limit_clause() {
        assert!(has_limit_clause("SELECT * FROM t LIMIT 10"));
        assert!(!has_limit_clause("SELECT * FROM t"));
        // LIMIT inside a subquery is not a statement-level LIMIT.
        assert!(!has_limit_clause(
            "SELECT * FROM (SELECT a FROM t LIMIT 5) d"
        ));
    }
}
