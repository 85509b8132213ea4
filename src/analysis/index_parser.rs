//! Token-based `CREATE INDEX` parsing and the aggregated index records.
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE [UNIQUE] INDEX [IF NOT EXISTS] [schema.]name ON table (columns)
//! CREATE INDEX idx ON t (a, b DESC)
//! CREATE UNIQUE INDEX idx ON t (a) WHERE a IS NOT NULL
//! ```
//!
//! `IndexInfo` is also the record the DDL extractor aggregates table-level
//! and inline constraints into, so `kind` covers constraints as well as
//! standalone indexes.

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use super::token_scanner::format_word;
use super::TokenScanner;

/// What an aggregated index-like record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexKind {
    PrimaryKey,
    Unique,
    Check,
    #[default]
    Index,
}

/// An index or index-backed constraint recovered from DDL text.
///
/// For `Check` records the `columns` list holds the boolean expression text
/// as its single element (the constraint has no column list of its own).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub table: String,
    pub kind: IndexKind,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_autoincrement: bool,
    pub is_primary_key: bool,
    /// Trailing option text: `ON CONFLICT …` for constraints, `WHERE …` for
    /// partial indexes.
    pub partial_clause: Option<String>,
    pub source_text: String,
    pub creation_sequence: usize,
}

/// A foreign-key constraint recovered from a `CREATE TABLE` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_update_action: Option<String>,
    pub on_delete_action: Option<String>,
    /// `[NOT] DEFERRABLE …` fragment, verbatim.
    pub partial_clause: Option<String>,
    pub source_text: String,
    pub creation_sequence: usize,
}

/// Parse a standalone `CREATE [UNIQUE] INDEX` statement.
///
/// Statements that do not match the shape return `None`; callers treat the
/// absence as "not an index statement".
pub fn parse_create_index_statement(sql: &str) -> Option<IndexInfo> {
    let mut scanner = TokenScanner::new(sql)?;
    scanner.skip_whitespace();

    if !scanner.check_keyword(Keyword::CREATE) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    let is_unique = scanner.check_keyword(Keyword::UNIQUE);
    if is_unique {
        scanner.advance();
        scanner.skip_whitespace();
    }

    if !scanner.check_keyword(Keyword::INDEX) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    // IF NOT EXISTS
    if scanner.check_keyword(Keyword::IF) {
        scanner.advance();
        scanner.skip_whitespace();
        if !scanner.check_keyword(Keyword::NOT) {
            return None;
        }
        scanner.advance();
        scanner.skip_whitespace();
        if !scanner.check_keyword(Keyword::EXISTS) {
            return None;
        }
        scanner.advance();
        scanner.skip_whitespace();
    }

    // [schema.]name — the index name is the part immediately preceding ON.
    let mut name = scanner.parse_identifier()?;
    while scanner.check_token(&Token::Period) {
        scanner.advance();
        name = scanner.parse_identifier()?;
    }
    scanner.skip_whitespace();

    if !scanner.check_keyword(Keyword::ON) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    let mut table = scanner.parse_identifier()?;
    while scanner.check_token(&Token::Period) {
        scanner.advance();
        let part = scanner.parse_identifier()?;
        table.push('.');
        table.push_str(&part);
    }
    scanner.skip_whitespace();

    let columns = parse_index_columns(&mut scanner)?;
    scanner.skip_whitespace();

    // Partial index predicate, captured with its WHERE keyword.
    let partial_clause = if scanner.check_keyword(Keyword::WHERE) {
        let clause = scanner.rest_to_string();
        (!clause.is_empty()).then_some(clause)
    } else {
        None
    };

    Some(IndexInfo {
        name,
        table,
        kind: if is_unique {
            IndexKind::Unique
        } else {
            IndexKind::Index
        },
        columns,
        is_unique,
        is_autoincrement: false,
        is_primary_key: false,
        partial_clause,
        source_text: sql.trim().to_string(),
        creation_sequence: 0,
    })
}

/// Parse the parenthesized column list, requoting quoted identifiers into
/// canonical double-quoted form and dropping `ASC`/`DESC`/`COLLATE` noise.
fn parse_index_columns(scanner: &mut TokenScanner) -> Option<Vec<String>> {
    if !scanner.check_token(&Token::LParen) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    let mut columns = Vec::new();
    while !scanner.is_at_end() && !scanner.check_token(&Token::RParen) {
        scanner.skip_whitespace();

        match scanner.current_token() {
            Some(Token::Word(w)) => {
                columns.push(if w.quote_style.is_some() {
                    format!("\"{}\"", w.value)
                } else {
                    format_word(w)
                });
                scanner.advance();
            }
            _ => break,
        }
        scanner.skip_whitespace();

        if scanner.check_keyword(Keyword::COLLATE) {
            scanner.advance();
            scanner.skip_whitespace();
            scanner.parse_identifier();
            scanner.skip_whitespace();
        }
        if scanner.check_keyword(Keyword::ASC) || scanner.check_keyword(Keyword::DESC) {
            scanner.advance();
            scanner.skip_whitespace();
        }

        if scanner.check_token(&Token::Comma) {
            scanner.advance();
            scanner.skip_whitespace();
        } else if !scanner.check_token(&Token::RParen) {
            // Expression index item; skip to the next separator.
            while !scanner.is_at_end()
                && !scanner.check_token(&Token::Comma)
                && !scanner.check_token(&Token::RParen)
            {
                if scanner.check_token(&Token::LParen) {
                    scanner.skip_parenthesized();
                } else {
                    scanner.advance();
                }
            }
            if scanner.check_token(&Token::Comma) {
                scanner.advance();
            }
        }
    }

    if scanner.check_token(&Token::RParen) {
        scanner.advance();
    }

    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}
