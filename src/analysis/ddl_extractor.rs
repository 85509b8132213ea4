//! Column and constraint extraction from literal `CREATE TABLE` text.
//!
//! SQLite persists table DDL as text, not as a structured catalog, so the
//! schema facts a front-end needs (column types, nullability, keys, foreign
//! keys) have to be recovered from the statement itself. The body between
//! the outermost parentheses is split on top-level commas into definition
//! lines, and each line is classified as a column definition or a
//! table-level constraint.
//!
//! Unrecognizable lines are skipped, never fatal; a statement without a
//! parenthesized body yields empty results from every extractor.

use std::collections::HashSet;

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use super::clause_scanner::{scan_statement, Scanned};
use super::index_parser::{ForeignKeyInfo, IndexInfo, IndexKind};
use super::TokenScanner;
use crate::util::strip_identifier_quotes;

/// One column definition line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
    pub default_value: Option<String>,
    pub check_expression: Option<String>,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_autoincrement: bool,
    pub is_unsigned: bool,
}

impl Default for ColumnInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            declared_type: String::new(),
            default_value: None,
            check_expression: None,
            is_nullable: true,
            is_primary_key: false,
            is_unique: false,
            is_autoincrement: false,
            is_unsigned: false,
        }
    }
}

/// `PRIMARY KEY (…)` table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub is_autoincrement: bool,
    /// `ON CONFLICT …`, verbatim.
    pub conflict_clause: Option<String>,
    pub source_text: String,
}

/// `UNIQUE (…)` table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub conflict_clause: Option<String>,
    pub source_text: String,
}

/// `CHECK (…)` table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    pub name: Option<String>,
    pub expression: String,
    pub source_text: String,
}

/// `FOREIGN KEY (…) REFERENCES …` table-level constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_update_action: Option<String>,
    pub on_delete_action: Option<String>,
    /// `[NOT] DEFERRABLE …` fragment, verbatim.
    pub deferrable_clause: Option<String>,
    pub source_text: String,
}

/// A classified table-level constraint line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey(PrimaryKeyConstraint),
    Unique(UniqueConstraint),
    Check(CheckConstraint),
    ForeignKey(ForeignKeyConstraint),
}

/// A classified definition line from a `CREATE TABLE` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Column(ColumnInfo),
    Constraint(TableConstraint),
}

/// The text between the outermost matching parentheses of a `CREATE TABLE`
/// statement, or `None` when no such pair exists.
pub(crate) fn table_body(sql: &str) -> Option<&str> {
    let mut open = None;
    let mut close = None;
    scan_statement(sql, |item| {
        if let Scanned::Symbol {
            offset,
            depth: 0,
            byte,
        } = item
        {
            match byte {
                b'(' if open.is_none() => open = Some(offset),
                b')' => close = Some(offset),
                _ => {}
            }
        }
    });
    match (open, close) {
        (Some(start), Some(end)) if end > start => Some(&sql[start + 1..end]),
        _ => None,
    }
}

/// The table name of a `CREATE TABLE` statement.
pub(crate) fn create_table_name(sql: &str) -> Option<String> {
    let mut scanner = TokenScanner::new(sql)?;
    scanner.skip_whitespace();
    if !scanner.check_keyword(Keyword::CREATE) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();
    // CREATE TEMP|TEMPORARY TABLE
    if scanner.check_keyword(Keyword::TEMP) || scanner.check_keyword(Keyword::TEMPORARY) {
        scanner.advance();
        scanner.skip_whitespace();
    }
    if !scanner.check_keyword(Keyword::TABLE) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();
    if scanner.check_keyword(Keyword::IF) {
        scanner.advance();
        scanner.skip_whitespace();
        scanner.advance(); // NOT
        scanner.skip_whitespace();
        scanner.advance(); // EXISTS
        scanner.skip_whitespace();
    }
    let mut name = scanner.parse_identifier()?;
    while scanner.check_token(&Token::Period) {
        scanner.advance();
        name = scanner.parse_identifier()?;
    }
    Some(name)
}

/// Split a DDL body on top-level commas only, trimming each definition line.
/// Commas inside nested parentheses (default expressions, type arguments)
/// and inside literals never split.
pub fn split_top_level_definitions(body: &str) -> Vec<String> {
    let mut cuts = Vec::new();
    scan_statement(body, |item| {
        if let Scanned::Symbol {
            offset,
            depth: 0,
            byte: b',',
        } = item
        {
            cuts.push(offset);
        }
    });

    let mut lines = Vec::new();
    let mut start = 0;
    for cut in cuts {
        lines.push(body[start..cut].trim().to_string());
        start = cut + 1;
    }
    lines.push(body[start..].trim().to_string());
    lines.retain(|line| !line.is_empty());
    lines
}

/// Classify one definition line as a column or a table-level constraint.
/// Lines with an unexpected leading token yield `None` and are skipped.
pub fn classify_definition_line(line: &str) -> Option<Definition> {
    let mut scanner = TokenScanner::new(line)?;
    scanner.skip_whitespace();

    let mut constraint_name = None;
    if scanner.check_keyword(Keyword::CONSTRAINT) {
        scanner.advance();
        scanner.skip_whitespace();
        constraint_name = Some(scanner.parse_identifier()?);
        scanner.skip_whitespace();
    }

    if scanner.check_keyword(Keyword::PRIMARY) {
        scanner.advance();
        return parse_primary_key_constraint(&mut scanner, constraint_name, line)
            .map(|c| Definition::Constraint(TableConstraint::PrimaryKey(c)));
    }
    if scanner.check_keyword(Keyword::UNIQUE) {
        scanner.advance();
        return parse_unique_constraint(&mut scanner, constraint_name, line)
            .map(|c| Definition::Constraint(TableConstraint::Unique(c)));
    }
    if scanner.check_keyword(Keyword::CHECK) {
        scanner.advance();
        return parse_check_constraint(&mut scanner, constraint_name, line)
            .map(|c| Definition::Constraint(TableConstraint::Check(c)));
    }
    if scanner.check_keyword(Keyword::FOREIGN) {
        scanner.advance();
        return parse_foreign_key_constraint(&mut scanner, constraint_name, line)
            .map(|c| Definition::Constraint(TableConstraint::ForeignKey(c)));
    }
    if constraint_name.is_some() {
        // CONSTRAINT <name> followed by something we do not recognize.
        return None;
    }

    parse_column_line(&mut scanner).map(Definition::Column)
}

/// Words that end the declared-type token run of a column definition.
const TYPE_RUN_TERMINATORS: [&str; 11] = [
    "NOT",
    "NULL",
    "DEFAULT",
    "PRIMARY",
    "UNIQUE",
    "CHECK",
    "REFERENCES",
    "COLLATE",
    "AUTOINCREMENT",
    "GENERATED",
    "CONSTRAINT",
];

fn parse_column_line(scanner: &mut TokenScanner) -> Option<ColumnInfo> {
    let name = scanner.parse_identifier()?;
    let mut column = ColumnInfo {
        name,
        ..ColumnInfo::default()
    };
    scanner.skip_whitespace();

    // Declared type: a run of words (e.g. UNSIGNED BIG INT) plus optional
    // parenthesized arguments (e.g. DECIMAL(10,2)).
    let mut type_parts: Vec<String> = Vec::new();
    loop {
        match scanner.current_token() {
            Some(Token::Word(w))
                if !TYPE_RUN_TERMINATORS
                    .iter()
                    .any(|t| w.value.eq_ignore_ascii_case(t)) =>
            {
                if w.value.eq_ignore_ascii_case("UNSIGNED") {
                    column.is_unsigned = true;
                }
                type_parts.push(w.value.clone());
                scanner.advance();
                scanner.skip_whitespace();
            }
            Some(Token::LParen) if !type_parts.is_empty() => {
                let args = scanner.consume_parenthesized()?;
                let joined = format!("{}{}", type_parts.join(" "), args);
                type_parts = vec![joined];
                scanner.skip_whitespace();
                break;
            }
            _ => break,
        }
    }
    column.declared_type = type_parts.join(" ");

    while !scanner.is_at_end() {
        scanner.skip_whitespace();
        if scanner.is_at_end() {
            break;
        }

        if scanner.check_keyword(Keyword::NOT) {
            scanner.advance();
            scanner.skip_whitespace();
            if scanner.check_keyword(Keyword::NULL) {
                column.is_nullable = false;
                scanner.advance();
            }
            continue;
        }
        if scanner.check_keyword(Keyword::PRIMARY) {
            column.is_primary_key = true;
            scanner.advance();
            continue;
        }
        if scanner.check_keyword(Keyword::UNIQUE) {
            column.is_unique = true;
            scanner.advance();
            continue;
        }
        if scanner.check_word_ci("AUTOINCREMENT") {
            column.is_autoincrement = true;
            scanner.advance();
            continue;
        }
        if scanner.check_word_ci("UNSIGNED") {
            column.is_unsigned = true;
            scanner.advance();
            continue;
        }
        if scanner.check_keyword(Keyword::DEFAULT) {
            scanner.advance();
            scanner.skip_whitespace();
            column.default_value = parse_default_value(scanner);
            continue;
        }
        if scanner.check_keyword(Keyword::CHECK) {
            scanner.advance();
            scanner.skip_whitespace();
            if let Some(group) = scanner.consume_parenthesized() {
                column.check_expression = Some(strip_outer_parens(&group));
            }
            continue;
        }
        scanner.advance();
    }

    Some(column)
}

/// A default is either a balanced parenthesized expression or one token,
/// optionally sign-prefixed.
fn parse_default_value(scanner: &mut TokenScanner) -> Option<String> {
    if scanner.check_token(&Token::LParen) {
        return scanner.consume_parenthesized();
    }

    let mut value = String::new();
    if scanner.check_token(&Token::Minus) || scanner.check_token(&Token::Plus) {
        if scanner.check_token(&Token::Minus) {
            value.push('-');
        }
        scanner.advance();
        scanner.skip_whitespace();
    }
    match scanner.current_token() {
        Some(token) => {
            value.push_str(&super::token_scanner::format_token(token));
            scanner.advance();
            Some(value)
        }
        None => None,
    }
}

fn strip_outer_parens(group: &str) -> String {
    group
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(group)
        .trim()
        .to_string()
}

/// Parse the parenthesized key column list of a PRIMARY KEY / UNIQUE
/// constraint. Returns the stripped column names and whether a trailing
/// `AUTOINCREMENT` was present on any item.
fn parse_key_columns(scanner: &mut TokenScanner) -> Option<(Vec<String>, bool)> {
    if !scanner.check_token(&Token::LParen) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    let mut columns = Vec::new();
    let mut is_autoincrement = false;

    while !scanner.is_at_end() && !scanner.check_token(&Token::RParen) {
        let column = scanner.parse_identifier()?;
        columns.push(strip_identifier_quotes(&column));
        scanner.skip_whitespace();

        // Per-item modifiers: COLLATE <x>, ASC/DESC, AUTOINCREMENT.
        loop {
            if scanner.check_keyword(Keyword::COLLATE) {
                scanner.advance();
                scanner.skip_whitespace();
                scanner.parse_identifier();
                scanner.skip_whitespace();
            } else if scanner.check_keyword(Keyword::ASC) || scanner.check_keyword(Keyword::DESC) {
                scanner.advance();
                scanner.skip_whitespace();
            } else if scanner.check_word_ci("AUTOINCREMENT") {
                is_autoincrement = true;
                scanner.advance();
                scanner.skip_whitespace();
            } else {
                break;
            }
        }

        if scanner.check_token(&Token::Comma) {
            scanner.advance();
            scanner.skip_whitespace();
        }
    }

    if scanner.check_token(&Token::RParen) {
        scanner.advance();
    }

    if columns.is_empty() {
        None
    } else {
        Some((columns, is_autoincrement))
    }
}

/// Trailing `ON CONFLICT <action>` clause, verbatim, when present.
fn parse_conflict_clause(scanner: &mut TokenScanner) -> Option<String> {
    scanner.skip_whitespace();
    if scanner.check_keyword(Keyword::ON) {
        let clause = scanner.rest_to_string();
        (!clause.is_empty()).then_some(clause)
    } else {
        None
    }
}

fn parse_primary_key_constraint(
    scanner: &mut TokenScanner,
    name: Option<String>,
    line: &str,
) -> Option<PrimaryKeyConstraint> {
    scanner.skip_whitespace();
    if !scanner.check_keyword(Keyword::KEY) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    let (columns, is_autoincrement) = parse_key_columns(scanner)?;
    let conflict_clause = parse_conflict_clause(scanner);

    Some(PrimaryKeyConstraint {
        name,
        columns,
        is_autoincrement,
        conflict_clause,
        source_text: line.trim().to_string(),
    })
}

fn parse_unique_constraint(
    scanner: &mut TokenScanner,
    name: Option<String>,
    line: &str,
) -> Option<UniqueConstraint> {
    scanner.skip_whitespace();
    let (columns, _) = parse_key_columns(scanner)?;
    let conflict_clause = parse_conflict_clause(scanner);

    Some(UniqueConstraint {
        name,
        columns,
        conflict_clause,
        source_text: line.trim().to_string(),
    })
}

fn parse_check_constraint(
    scanner: &mut TokenScanner,
    name: Option<String>,
    line: &str,
) -> Option<CheckConstraint> {
    scanner.skip_whitespace();
    let group = scanner.consume_parenthesized()?;

    Some(CheckConstraint {
        name,
        expression: strip_outer_parens(&group),
        source_text: line.trim().to_string(),
    })
}

fn parse_foreign_key_constraint(
    scanner: &mut TokenScanner,
    name: Option<String>,
    line: &str,
) -> Option<ForeignKeyConstraint> {
    scanner.skip_whitespace();
    if !scanner.check_keyword(Keyword::KEY) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    let (columns, _) = parse_key_columns(scanner)?;
    scanner.skip_whitespace();

    if !scanner.check_keyword(Keyword::REFERENCES) {
        return None;
    }
    scanner.advance();
    scanner.skip_whitespace();

    let mut referenced_table = scanner.parse_identifier()?;
    while scanner.check_token(&Token::Period) {
        scanner.advance();
        let part = scanner.parse_identifier()?;
        referenced_table.push('.');
        referenced_table.push_str(&part);
    }
    scanner.skip_whitespace();

    let referenced_columns = if scanner.check_token(&Token::LParen) {
        parse_key_columns(scanner).map(|(cols, _)| cols)?
    } else {
        Vec::new()
    };

    let mut constraint = ForeignKeyConstraint {
        name,
        columns,
        referenced_table: strip_identifier_quotes(&referenced_table),
        referenced_columns,
        source_text: line.trim().to_string(),
        ..ForeignKeyConstraint::default()
    };

    // Remaining tokens: ON UPDATE/DELETE <action>, MATCH <x>, [NOT] DEFERRABLE …
    while !scanner.is_at_end() {
        scanner.skip_whitespace();
        if scanner.is_at_end() {
            break;
        }

        if scanner.check_keyword(Keyword::ON) {
            scanner.advance();
            scanner.skip_whitespace();
            if scanner.check_keyword(Keyword::UPDATE) {
                scanner.advance();
                scanner.skip_whitespace();
                constraint.on_update_action = parse_fk_action(scanner);
            } else if scanner.check_keyword(Keyword::DELETE) {
                scanner.advance();
                scanner.skip_whitespace();
                constraint.on_delete_action = parse_fk_action(scanner);
            }
            continue;
        }
        if scanner.check_keyword(Keyword::MATCH) {
            scanner.advance();
            scanner.skip_whitespace();
            scanner.parse_identifier();
            continue;
        }
        if scanner.check_word_ci("DEFERRABLE")
            || (scanner.check_keyword(Keyword::NOT) && peek_word_after(scanner, "DEFERRABLE"))
        {
            let clause = scanner.rest_to_string();
            constraint.deferrable_clause = (!clause.is_empty()).then_some(clause);
            break;
        }
        scanner.advance();
    }

    Some(constraint)
}

/// A referential action is one token (`CASCADE`, `RESTRICT`) or two
/// (`SET NULL`, `SET DEFAULT`, `NO ACTION`).
fn parse_fk_action(scanner: &mut TokenScanner) -> Option<String> {
    let first = scanner.parse_identifier()?;
    if first.eq_ignore_ascii_case("SET") || first.eq_ignore_ascii_case("NO") {
        scanner.skip_whitespace();
        let second = scanner.parse_identifier()?;
        Some(format!("{} {}", first.to_uppercase(), second.to_uppercase()))
    } else {
        Some(first.to_uppercase())
    }
}

/// True when the word after the current token (skipping whitespace) matches.
fn peek_word_after(scanner: &TokenScanner, word: &str) -> bool {
    scanner
        .tokens()
        .iter()
        .skip(scanner.pos() + 1)
        .map(|t| &t.token)
        .find(|t| !matches!(t, Token::Whitespace(_)))
        .is_some_and(|t| matches!(t, Token::Word(w) if w.value.eq_ignore_ascii_case(word)))
}

/// All column definitions of a `CREATE TABLE` statement, in source order.
pub fn parse_create_table_columns(sql: &str) -> Vec<ColumnInfo> {
    let Some(body) = table_body(sql) else {
        return Vec::new();
    };
    split_top_level_definitions(body)
        .iter()
        .filter_map(|line| match classify_definition_line(line) {
            Some(Definition::Column(column)) => Some(column),
            _ => None,
        })
        .collect()
}

/// All index-backed constraints of a `CREATE TABLE` statement: table-level
/// PRIMARY KEY / UNIQUE / CHECK lines plus inline column modifiers, as
/// `IndexInfo` records deduplicated by `(kind, columns)`.
pub fn parse_create_table_constraints(sql: &str) -> Vec<IndexInfo> {
    let Some(body) = table_body(sql) else {
        return Vec::new();
    };
    let table = create_table_name(sql).unwrap_or_default();

    let mut records = Vec::new();
    for line in split_top_level_definitions(body) {
        match classify_definition_line(&line) {
            Some(Definition::Column(column)) => {
                if column.is_primary_key {
                    records.push(IndexInfo {
                        table: table.clone(),
                        kind: IndexKind::PrimaryKey,
                        columns: vec![column.name.clone()],
                        is_unique: true,
                        is_autoincrement: column.is_autoincrement,
                        is_primary_key: true,
                        source_text: line.clone(),
                        ..IndexInfo::default()
                    });
                }
                if column.is_unique {
                    records.push(IndexInfo {
                        table: table.clone(),
                        kind: IndexKind::Unique,
                        columns: vec![column.name.clone()],
                        is_unique: true,
                        source_text: line.clone(),
                        ..IndexInfo::default()
                    });
                }
            }
            Some(Definition::Constraint(TableConstraint::PrimaryKey(pk))) => {
                records.push(IndexInfo {
                    name: pk.name.unwrap_or_default(),
                    table: table.clone(),
                    kind: IndexKind::PrimaryKey,
                    columns: pk.columns,
                    is_unique: true,
                    is_autoincrement: pk.is_autoincrement,
                    is_primary_key: true,
                    partial_clause: pk.conflict_clause,
                    source_text: pk.source_text,
                    ..IndexInfo::default()
                });
            }
            Some(Definition::Constraint(TableConstraint::Unique(unique))) => {
                records.push(IndexInfo {
                    name: unique.name.unwrap_or_default(),
                    table: table.clone(),
                    kind: IndexKind::Unique,
                    columns: unique.columns,
                    is_unique: true,
                    partial_clause: unique.conflict_clause,
                    source_text: unique.source_text,
                    ..IndexInfo::default()
                });
            }
            Some(Definition::Constraint(TableConstraint::Check(check))) => {
                records.push(IndexInfo {
                    name: check.name.unwrap_or_default(),
                    table: table.clone(),
                    kind: IndexKind::Check,
                    columns: vec![check.expression],
                    source_text: check.source_text,
                    ..IndexInfo::default()
                });
            }
            _ => {}
        }
    }

    // A key declared both inline and as a table-level line collapses to one.
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for mut record in records {
        let key = (record.kind, record.columns.join(",").to_uppercase());
        if seen.insert(key) {
            record.creation_sequence = deduped.len();
            deduped.push(record);
        }
    }
    deduped
}

/// All foreign-key constraints of a `CREATE TABLE` statement.
pub fn parse_create_table_foreign_keys(sql: &str) -> Vec<ForeignKeyInfo> {
    let Some(body) = table_body(sql) else {
        return Vec::new();
    };

    let mut keys = Vec::new();
    for line in split_top_level_definitions(body) {
        if let Some(Definition::Constraint(TableConstraint::ForeignKey(fk))) =
            classify_definition_line(&line)
        {
            keys.push(ForeignKeyInfo {
                name: fk.name.unwrap_or_default(),
                columns: fk.columns,
                referenced_table: fk.referenced_table,
                referenced_columns: fk.referenced_columns,
                on_update_action: fk.on_update_action,
                on_delete_action: fk.on_delete_action,
                partial_clause: fk.deferrable_clause,
                source_text: fk.source_text,
                creation_sequence: keys.len(),
            });
        }
    }
    keys
}
