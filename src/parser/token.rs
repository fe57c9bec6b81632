//! Tokens and Source Positions
//!
//! Tokens are plain immutable values. A quoted string that contained at least
//! one `{…}` interpolation carries its pieces in `payload` instead of `text`.

use std::fmt;

use crate::interpreter::helpers::quoting::{escape_quoted, quote};

/// Token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A literal word, quoted or not
    String,
    /// One embedded `{…}` expression inside a quoted string
    StringInterpolation,
    Dollar,
    Semicolon,
    Ampersand,
    Pipe,
    LeftAngle,
    RightAngle,
    DoubleRightAngle,
    TripleRightAngle,
    LeftParen,
    RightParen,
    EndOfInput,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::StringInterpolation => "StringInterpolation",
            Self::Dollar => "Dollar",
            Self::Semicolon => "Semicolon",
            Self::Ampersand => "Ampersand",
            Self::Pipe => "Pipe",
            Self::LeftAngle => "LeftAngle",
            Self::RightAngle => "RightAngle",
            Self::DoubleRightAngle => "DoubleRightAngle",
            Self::TripleRightAngle => "TripleRightAngle",
            Self::LeftParen => "LeftParen",
            Self::RightParen => "RightParen",
            Self::EndOfInput => "EndOfInput",
        }
    }

    /// The fixed source text of a punctuation kind.
    pub fn punctuation(&self) -> Option<&'static str> {
        match self {
            Self::Dollar => Some("$"),
            Self::Semicolon => Some(";"),
            Self::Ampersand => Some("&"),
            Self::Pipe => Some("|"),
            Self::LeftAngle => Some("<"),
            Self::RightAngle => Some(">"),
            Self::DoubleRightAngle => Some(">>"),
            Self::TripleRightAngle => Some(">>>"),
            Self::LeftParen => Some("("),
            Self::RightParen => Some(")"),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Char offset from the start of the source
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }

    /// Position of the first character of a source.
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

/// Span in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// Zero-width span at a single location.
    pub fn at(location: Location) -> Self {
        Self::new(location, location)
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text; `None` for end of input, interpolation pieces and
    /// strings that carry a payload
    pub text: Option<String>,
    pub payload: Option<Vec<Token>>,
    /// Set for `String` tokens read from a quoted run
    pub quoted: bool,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: Option<String>, span: Span) -> Self {
        Self {
            kind,
            text,
            payload: None,
            quoted: false,
            span,
        }
    }

    pub fn with_payload(kind: TokenKind, payload: Vec<Token>, span: Span) -> Self {
        Self {
            kind,
            text: None,
            payload: Some(payload),
            quoted: false,
            span,
        }
    }

    /// Mark the token as read from a quoted run.
    pub fn quoted(mut self) -> Self {
        self.quoted = true;
        self
    }

    /// True for a `String` token holding interpolation pieces.
    pub fn is_interpolated(&self) -> bool {
        self.kind == TokenKind::String && self.payload.is_some()
    }

    /// Render the token back to source text that lexes to an equal token
    /// (modulo spans and quote character).
    pub fn to_source(&self) -> String {
        match self.kind {
            TokenKind::String => match &self.payload {
                None if self.quoted => quote(self.text.as_deref().unwrap_or_default()),
                None => self.text.clone().unwrap_or_default(),
                Some(pieces) => {
                    let mut out = String::from("\"");
                    for piece in pieces {
                        match piece.kind {
                            TokenKind::String => {
                                out.push_str(&escape_quoted(piece.text.as_deref().unwrap_or_default()))
                            }
                            _ => out.push_str(&piece.to_source()),
                        }
                    }
                    out.push('"');
                    out
                }
            },
            // Only reachable for pieces of an interpolated string.
            TokenKind::StringInterpolation => {
                let inner: Vec<String> = self
                    .payload
                    .iter()
                    .flatten()
                    .filter(|t| t.kind != TokenKind::EndOfInput)
                    .map(Token::to_source)
                    .collect();
                format!("{{{}}}", inner.join(" "))
            }
            TokenKind::EndOfInput => String::new(),
            other => other.punctuation().unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {}:{}",
            self.kind.as_str(),
            self.span.start.line,
            self.span.start.column
        )?;
        if let Some(text) = &self.text {
            write!(f, " {:?}", text)?;
        }
        if let Some(payload) = &self.payload {
            write!(f, " [{} pieces]", payload.len())?;
        }
        Ok(())
    }
}
