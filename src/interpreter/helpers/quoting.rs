//! Shell value quoting utilities
//!
//! Renders literal values back into source text that the lexer reads as the
//! same literal. Used when printing tokens and segment trees.

/// Characters the lexer always reads as punctuation.
pub const PUNCTUATION_CHARS: &[char] = &['$', ';', '&', '|', '<', '>', '(', ')'];

/// Characters that open a quoted run when they start a word.
pub const QUOTE_CHARS: &[char] = &['"', '\'', '`'];

/// Check if a character may appear in an unquoted word
pub fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && !PUNCTUATION_CHARS.contains(&c)
}

/// Check if a value reads back as one unquoted word in normal mode
pub fn is_bare_word(value: &str) -> bool {
    match value.chars().next() {
        None => false,
        Some(first) if QUOTE_CHARS.contains(&first) => false,
        Some(_) => value.chars().all(is_word_char),
    }
}

/// Quote a value only if it cannot be written as a bare word.
///
/// `}` forces quoting because it closes an unquoted run inside `{…}`.
pub fn escape(value: &str) -> String {
    if is_bare_word(value) && !value.contains('}') {
        value.to_string()
    } else {
        quote(value)
    }
}

/// Always wrap a value in double quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", escape_quoted(value))
}

/// Escape the contents of a double-quoted run (without the quotes).
pub fn escape_quoted(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '{') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
