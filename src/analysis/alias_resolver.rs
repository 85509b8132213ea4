//! Table and alias bindings from `FROM`/`UPDATE` clauses.
//!
//! The resolver turns the substring between `FROM`/`UPDATE` and the next
//! top-level clause into an ordered `(table, alias)` list. Order matters:
//! unqualified-column resolution scans the list backward to pick the nearest
//! preceding source, so entries are always emitted in source order.

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use super::clause_scanner::{find_top_level_keyword, scan_statement, Scanned};
use super::TokenScanner;
use crate::util::{starts_with_ci, strip_identifier_quotes};

/// One source referenced by a statement. `alias` is empty when the source
/// has no alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAlias {
    pub table: String,
    pub alias: String,
}

/// Words that terminate a source segment or cannot serve as an implicit
/// alias.
const SEGMENT_KEYWORDS: [&str; 19] = [
    "JOIN", "LEFT", "RIGHT", "INNER", "FULL", "CROSS", "NATURAL", "OUTER", "ON", "USING", "WHERE",
    "GROUP", "ORDER", "LIMIT", "HAVING", "WINDOW", "UNION", "INTERSECT", "EXCEPT",
];

fn is_segment_keyword(word: &str) -> bool {
    SEGMENT_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k))
}

/// Extract the ordered `(table, alias)` list from a statement's `FROM`
/// clause. The clause is split on top-level commas and `JOIN` keywords;
/// derived tables (parenthesized subqueries) contribute no entry.
pub fn parse_from_clause(sql: &str) -> Vec<TableAlias> {
    let Some((from_offset, _)) = find_top_level_keyword(sql, 0, &["FROM"]) else {
        return Vec::new();
    };
    let clause_start = from_offset + "FROM".len();
    let clause_end = find_top_level_keyword(
        sql,
        clause_start,
        &["WHERE", "GROUP", "ORDER", "LIMIT", "HAVING", "WINDOW"],
    )
    .map(|(offset, _)| offset)
    .unwrap_or(sql.len());

    parse_source_list(&sql[clause_start..clause_end])
}

/// Extract the target `(table, alias)` list from an `UPDATE` statement —
/// the span between `UPDATE [OR <action>]` and the top-level `SET`.
pub fn parse_update_target_clause(sql: &str) -> Vec<TableAlias> {
    let Some((update_offset, _)) = find_top_level_keyword(sql, 0, &["UPDATE"]) else {
        return Vec::new();
    };
    let clause_start = update_offset + "UPDATE".len();
    let clause_end = find_top_level_keyword(sql, clause_start, &["SET"])
        .map(|(offset, _)| offset)
        .unwrap_or(sql.len());

    let mut clause = sql[clause_start..clause_end].trim_start();
    // UPDATE OR ROLLBACK|ABORT|REPLACE|FAIL|IGNORE <table>
    if starts_with_ci(clause, "OR") && clause[2..].starts_with(char::is_whitespace) {
        let rest = clause[2..].trim_start();
        clause = match rest.find(char::is_whitespace) {
            Some(space) => &rest[space..],
            None => "",
        };
    }

    parse_source_list(clause)
}

/// Split a source clause on top-level commas and `JOIN` keywords and parse
/// each segment.
fn parse_source_list(clause: &str) -> Vec<TableAlias> {
    let mut boundaries = Vec::new();
    scan_statement(clause, |item| match item {
        Scanned::Symbol {
            offset,
            depth: 0,
            byte: b',',
        } => boundaries.push((offset, offset + 1)),
        Scanned::Word {
            offset,
            depth: 0,
            text,
        } if text.eq_ignore_ascii_case("JOIN") => {
            boundaries.push((offset, offset + text.len()));
        }
        _ => {}
    });

    let mut sources = Vec::new();
    let mut start = 0;
    for &(cut, resume) in &boundaries {
        if let Some(source) = parse_source_segment(&clause[start..cut]) {
            sources.push(source);
        }
        start = resume;
    }
    if let Some(source) = parse_source_segment(&clause[start..]) {
        sources.push(source);
    }
    sources
}

/// Parse one source segment: `table [AS alias | alias] [ON …]`, with any
/// trailing join modifiers (from a split before `JOIN`) ignored.
fn parse_source_segment(segment: &str) -> Option<TableAlias> {
    let mut scanner = TokenScanner::new(segment)?;
    scanner.skip_whitespace();

    // Derived table: no table binding to report.
    if scanner.check_token(&Token::LParen) {
        return None;
    }

    let mut table = scanner.parse_identifier()?;
    // schema-qualified: main.orders
    while scanner.check_token(&Token::Period) {
        scanner.advance();
        let part = scanner.parse_identifier()?;
        table.push('.');
        table.push_str(&part);
    }
    scanner.skip_whitespace();

    let mut alias = String::new();
    if scanner.check_keyword(Keyword::AS) {
        scanner.advance();
        scanner.skip_whitespace();
        alias = scanner.parse_identifier().unwrap_or_default();
    } else if let Some(Token::Word(w)) = scanner.current_token() {
        if !is_segment_keyword(&w.value) {
            alias = w.value.clone();
        }
    }

    Some(TableAlias {
        table: strip_identifier_quotes(&table),
        alias: strip_identifier_quotes(&alias),
    })
}

/// Find the alias bound to `target_table_upper` in a token sequence.
///
/// `AS <x>` wins; a bare identifier that is neither a known table nor a
/// clause/join keyword is an implicit alias; otherwise the alias is the
/// table name itself. Returns an empty string when the table never occurs.
pub fn resolve_alias_for_table(
    tokens: &[String],
    target_table_upper: &str,
    all_known_tables: &[String],
) -> String {
    for (i, token) in tokens.iter().enumerate() {
        let bare = strip_identifier_quotes(token);
        if !bare.eq_ignore_ascii_case(target_table_upper) {
            continue;
        }

        match tokens.get(i + 1) {
            Some(next) if next.eq_ignore_ascii_case("AS") => {
                if let Some(alias) = tokens.get(i + 2) {
                    return strip_identifier_quotes(alias);
                }
            }
            Some(next) => {
                let candidate = strip_identifier_quotes(next);
                let known = all_known_tables
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(&candidate));
                if !known && !is_segment_keyword(&candidate) && !candidate.is_empty() {
                    return candidate;
                }
            }
            None => {}
        }
        return bare;
    }
    String::new()
}
