//! Null-predicate column extraction for index-usage analysis.
//!
//! Finds `IS [NOT] NULL` / `ISNULL` / `NOTNULL` predicates in a statement
//! and resolves each referenced column to a concrete table through the
//! statement's alias map. Ambiguity is surfaced, not resolved: an
//! unqualified column with no syntactically preceding binding yields one
//! entry per candidate table.

use sqlparser::tokenizer::Token;

use super::alias_resolver::TableAlias;
use super::TokenScanner;

/// `(table, column)` pairs for every null predicate in the statement.
pub fn find_null_predicate_columns(sql: &str, aliases: &[TableAlias]) -> Vec<(String, String)> {
    let Some(scanner) = TokenScanner::new(sql) else {
        return Vec::new();
    };
    let tokens: Vec<&Token> = scanner
        .tokens()
        .iter()
        .map(|t| &t.token)
        .filter(|t| !matches!(t, Token::Whitespace(_)))
        .collect();

    let word_at = |i: usize| -> Option<&str> {
        match tokens.get(i) {
            Some(Token::Word(w)) => Some(w.value.as_str()),
            _ => None,
        }
    };

    let mut results = Vec::new();
    for i in 0..tokens.len() {
        let Some(word) = word_at(i) else { continue };

        let is_predicate = if word.eq_ignore_ascii_case("IS") {
            word_at(i + 1).is_some_and(|w| w.eq_ignore_ascii_case("NULL"))
                || (word_at(i + 1).is_some_and(|w| w.eq_ignore_ascii_case("NOT"))
                    && word_at(i + 2).is_some_and(|w| w.eq_ignore_ascii_case("NULL")))
        } else {
            word.eq_ignore_ascii_case("ISNULL") || word.eq_ignore_ascii_case("NOTNULL")
        };
        if !is_predicate || i == 0 {
            continue;
        }

        let Some(column) = word_at(i - 1) else {
            continue;
        };

        // Qualified reference: q.column
        let qualifier = if i >= 3 && matches!(tokens[i - 2], Token::Period) {
            word_at(i - 3)
        } else {
            None
        };

        match qualifier {
            Some(qualifier) => {
                let table = aliases
                    .iter()
                    .find(|a| {
                        a.alias.eq_ignore_ascii_case(qualifier)
                            || a.table.eq_ignore_ascii_case(qualifier)
                    })
                    .map(|a| a.table.clone())
                    .unwrap_or_else(|| qualifier.to_string());
                results.push((table, column.to_string()));
            }
            None => {
                resolve_unqualified(&tokens, i, column, aliases, &mut results);
            }
        }
    }
    results
}

/// Bind an unqualified column to the nearest preceding token matching a
/// known alias or table; with no such token, every mapped table is a
/// candidate.
fn resolve_unqualified(
    tokens: &[&Token],
    predicate_pos: usize,
    column: &str,
    aliases: &[TableAlias],
    results: &mut Vec<(String, String)>,
) {
    for k in (0..predicate_pos.saturating_sub(1)).rev() {
        let Token::Word(w) = tokens[k] else { continue };
        if let Some(binding) = aliases.iter().find(|a| {
            a.alias.eq_ignore_ascii_case(&w.value) || a.table.eq_ignore_ascii_case(&w.value)
        }) {
            results.push((binding.table.clone(), column.to_string()));
            return;
        }
    }
    for binding in aliases {
        results.push((binding.table.clone(), column.to_string()));
    }
}
