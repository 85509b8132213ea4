//! Shared text helpers.
//!
//! SQL keywords are matched case-insensitively everywhere in this crate, so
//! these helpers avoid allocating uppercase copies of the statement text.

/// Case-insensitive substring search without allocating an uppercase copy.
#[inline]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle).is_some()
}

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Case-insensitive find — returns byte offset of first occurrence of `needle` in `haystack`.
#[inline]
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle_bytes = needle.as_bytes();
    let haystack_bytes = haystack.as_bytes();
    if needle_bytes.len() > haystack_bytes.len() {
        return None;
    }
    haystack_bytes
        .windows(needle_bytes.len())
        .position(|window| window.eq_ignore_ascii_case(needle_bytes))
}

/// Strips SQLite identifier delimiters (`"…"`, `` `…` ``, `[…]`) and
/// surrounding whitespace from an identifier.
pub fn strip_identifier_quotes(ident: &str) -> String {
    ident
        .trim()
        .trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']' || c == '\'')
        .to_string()
}
