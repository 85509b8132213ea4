//! Shared token navigation over a single SQL statement.
//!
//! The DDL extractor, the `CREATE INDEX` parser, and the null-predicate
//! extractor all walk the same kind of token stream. `TokenScanner` wraps a
//! tokenized statement with position tracking and the navigation helpers
//! they share, so each of them only contains its own shape logic.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, Word};

/// Token stream with a cursor over a single SQL statement.
pub(crate) struct TokenScanner {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenScanner {
    /// Tokenize a statement with the SQLite dialect. Returns `None` when the
    /// text cannot be tokenized (unterminated string, stray delimiter).
    pub fn new(sql: &str) -> Option<Self> {
        let dialect = SQLiteDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize_with_location()
            .ok()?;

        Some(Self { tokens, pos: 0 })
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn tokens(&self) -> &[TokenWithSpan] {
        &self.tokens
    }

    #[inline]
    pub fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace tokens.
    pub fn skip_whitespace(&mut self) {
        while matches!(self.current_token(), Some(Token::Whitespace(_))) {
            self.advance();
        }
    }

    /// Check if the current token is a specific keyword.
    #[inline]
    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current_token(), Some(Token::Word(w)) if w.keyword == keyword)
    }

    /// Check if the current token is a word matching case-insensitively.
    ///
    /// Needed for SQLite words sqlparser has no `Keyword` for (e.g.
    /// `AUTOINCREMENT`, `DEFERRABLE`, `NOTNULL`).
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        matches!(self.current_token(), Some(Token::Word(w)) if w.value.eq_ignore_ascii_case(word))
    }

    /// Check if the current token matches a token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        match self.current_token() {
            Some(token) => std::mem::discriminant(token) == std::mem::discriminant(expected),
            None => false,
        }
    }

    /// Parse an identifier, returning its bare value with any `"`/`` ` ``/`[]`
    /// delimiters stripped by the tokenizer. Advances on success.
    pub fn parse_identifier(&mut self) -> Option<String> {
        match self.current_token() {
            Some(Token::Word(w)) => {
                let name = w.value.clone();
                self.advance();
                Some(name)
            }
            // SQLite accepts 'literal' identifiers in some DDL positions.
            Some(Token::SingleQuotedString(s)) => {
                let name = s.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    /// Skip a parenthesized group, handling nesting. Position must be at the
    /// opening parenthesis; afterwards it is past the matching close.
    pub fn skip_parenthesized(&mut self) {
        if !self.check_token(&Token::LParen) {
            return;
        }

        let mut depth = 0;
        while !self.is_at_end() {
            if self.check_token(&Token::LParen) {
                depth += 1;
            } else if self.check_token(&Token::RParen) {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return;
                }
            }
            self.advance();
        }
    }

    /// Consume a parenthesized group and return its text including the outer
    /// parentheses. Returns `None` when not positioned at `(`.
    pub fn consume_parenthesized(&mut self) -> Option<String> {
        if !self.check_token(&Token::LParen) {
            return None;
        }

        let start = self.pos;
        let mut depth = 0;

        while !self.is_at_end() {
            if self.check_token(&Token::LParen) {
                depth += 1;
            } else if self.check_token(&Token::RParen) {
                depth -= 1;
                if depth == 0 {
                    let end = self.pos + 1;
                    self.advance();
                    return Some(self.tokens_to_string(start, end));
                }
            }
            self.advance();
        }

        None
    }

    /// Reconstruct statement text from a token range, preserving SQLite
    /// quoting of identifiers and collapsing whitespace runs to one space.
    pub fn tokens_to_string(&self, start: usize, end: usize) -> String {
        let mut out = String::new();
        let mut last_was_space = false;

        for item in &self.tokens[start..end.min(self.tokens.len())] {
            if matches!(item.token, Token::Whitespace(_)) {
                if !last_was_space && !out.is_empty() {
                    out.push(' ');
                }
                last_was_space = true;
                continue;
            }
            last_was_space = false;
            out.push_str(&format_token(&item.token));
        }

        out.trim().to_string()
    }

    /// Collect everything from the current position to the end of the
    /// statement (or the first semicolon) as reconstructed text.
    pub fn rest_to_string(&mut self) -> String {
        let start = self.pos;
        while !self.is_at_end() && !self.check_token(&Token::SemiColon) {
            self.advance();
        }
        self.tokens_to_string(start, self.pos)
    }
}

/// Render one token back to SQLite source form.
pub(crate) fn format_token(token: &Token) -> String {
    match token {
        Token::Word(w) => format_word(w),
        Token::Number(n, _) => n.clone(),
        Token::SingleQuotedString(s) => format!("'{}'", s.replace('\'', "''")),
        Token::DoubleQuotedString(s) => format!("\"{}\"", s),
        Token::Whitespace(_) => " ".to_string(),
        other => other.to_string(),
    }
}

/// Render a word token, restoring its original delimiter style.
pub(crate) fn format_word(word: &Word) -> String {
    match word.quote_style {
        Some('"') => format!("\"{}\"", word.value),
        Some('`') => format!("`{}`", word.value),
        Some('[') => format!("[{}]", word.value),
        _ => word.value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tokenizes_sqlite_quoting() {
        let mut scanner = TokenScanner::new("`a` \"b\" [c]").unwrap();
        assert_eq!(scanner.parse_identifier(), Some("a".to_string()));
        scanner.skip_whitespace();
        assert_eq!(scanner.parse_identifier(), Some("b".to_string()));
        scanner.skip_whitespace();
        assert_eq!(scanner.parse_identifier(), Some("c".to_string()));
    }

    #[test]
    fn test_check_keyword_and_word_ci() {
        let mut scanner = TokenScanner::new("PRIMARY KEY autoincrement").unwrap();
        assert!(scanner.check_keyword(Keyword::PRIMARY));
        scanner.advance();
        scanner.skip_whitespace();
        assert!(scanner.check_keyword(Keyword::KEY));
        scanner.advance();
        scanner.skip_whitespace();
        assert!(scanner.check_word_ci("AUTOINCREMENT"));
    }

    #[test]
    fn test_consume_parenthesized_nested() {
        let mut scanner = TokenScanner::new("(a, (b, c), d) rest").unwrap();
        let group = scanner.consume_parenthesized().unwrap();
        assert_eq!(group, "(a, (b, c), d)");
        scanner.skip_whitespace();
        assert!(scanner.check_word_ci("rest"));
    }

    #[test]
    fn test_skip_parenthesized() {
        let mut scanner = TokenScanner::new("(x (y) z) tail").unwrap();
        scanner.skip_parenthesized();
        scanner.skip_whitespace();
        assert!(scanner.check_word_ci("tail"));
    }

    #[test]
    fn test_tokens_to_string_preserves_quotes() {
        let mut scanner = TokenScanner::new("\"id\"  =  'o''brien'").unwrap();
        let text = scanner.rest_to_string();
        assert_eq!(text, "\"id\" = 'o''brien'");
    }

    #[test]
    fn test_rest_to_string_stops_at_semicolon() {
        let mut scanner = TokenScanner::new("WHERE a = 1; SELECT 2").unwrap();
        assert_eq!(scanner.rest_to_string(), "WHERE a = 1");
    }
}
