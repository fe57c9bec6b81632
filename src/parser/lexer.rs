//! Lexer for the lumi shell language
//!
//! Converts a line of input into a flat token stream ending in `EndOfInput`.
//! Quoted runs may embed `{…}` expressions; each one is lexed by a separate
//! single-use [`InterpolationLexer`] that starts at the brace and hands back
//! its tokens together with the position where it stopped.

use std::mem;

use crate::interpreter::helpers::quoting::{is_word_char, QUOTE_CHARS};
use crate::parser::token::{Location, Span, Token, TokenKind};
use crate::parser::types::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Inside `{…}`: a bare `}` ends the token stream
    Interpolation,
}

/// Top-level lexer. `tokenize` can be called any number of times.
pub struct Lexer {
    input: Vec<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
        }
    }

    pub fn tokenize(&self) -> Result<Vec<Token>, SyntaxError> {
        let (tokens, _) = Scanner::new(&self.input, Location::start(), Mode::Normal).run()?;
        Ok(tokens)
    }
}

/// Lexes the body of one string interpolation.
///
/// Consumed by [`InterpolationLexer::tokenize`], which returns the tokens
/// (terminated by `EndOfInput`) and the cursor at the closing `}` or at the
/// end of the source if none was found.
pub struct InterpolationLexer<'a> {
    scanner: Scanner<'a>,
}

impl<'a> InterpolationLexer<'a> {
    pub fn new(input: &'a [char], start: Location) -> Self {
        Self {
            scanner: Scanner::new(input, start, Mode::Interpolation),
        }
    }

    pub fn tokenize(self) -> Result<(Vec<Token>, Location), SyntaxError> {
        self.scanner.run()
    }
}

struct Scanner<'a> {
    input: &'a [char],
    cursor: Location,
    mode: Mode,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [char], start: Location, mode: Mode) -> Self {
        Self {
            input,
            cursor: start,
            mode,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<(Vec<Token>, Location), SyntaxError> {
        loop {
            self.skip_whitespace();
            let Some(c) = self.current() else {
                break;
            };
            if self.mode == Mode::Interpolation && c == '}' {
                break;
            }
            let token = self.next_token(c)?;
            self.tokens.push(token);
        }

        self.tokens
            .push(Token::new(TokenKind::EndOfInput, None, Span::at(self.cursor)));
        Ok((self.tokens, self.cursor))
    }

    fn current(&self) -> Option<char> {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.cursor.offset + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.cursor.offset += 1;
        if c == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_unquoted_char(&self, c: char) -> bool {
        is_word_char(c) && !(self.mode == Mode::Interpolation && c == '}')
    }

    fn next_token(&mut self, c: char) -> Result<Token, SyntaxError> {
        if let Some(token) = self.read_punctuation(c) {
            return Ok(token);
        }
        if QUOTE_CHARS.contains(&c) {
            return self.read_quoted(c);
        }
        if self.is_unquoted_char(c) {
            return Ok(self.read_word());
        }

        Err(SyntaxError::at(
            format!(
                "Unexpected character '{}' (0x{:04X})",
                c.escape_debug(),
                c as u32
            ),
            self.cursor,
        ))
    }

    fn read_punctuation(&mut self, c: char) -> Option<Token> {
        let kind = match c {
            '$' => TokenKind::Dollar,
            ';' => TokenKind::Semicolon,
            '&' => TokenKind::Ampersand,
            '|' => TokenKind::Pipe,
            '<' => TokenKind::LeftAngle,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            // Longest match first
            '>' => match (self.peek(1), self.peek(2)) {
                (Some('>'), Some('>')) => TokenKind::TripleRightAngle,
                (Some('>'), _) => TokenKind::DoubleRightAngle,
                _ => TokenKind::RightAngle,
            },
            _ => return None,
        };

        let text = kind.punctuation()?;
        let start = self.cursor;
        for _ in text.chars() {
            self.advance();
        }
        Some(Token::new(
            kind,
            Some(text.to_string()),
            Span::new(start, self.cursor),
        ))
    }

    fn read_word(&mut self) -> Token {
        let start = self.cursor;
        let mut text = String::new();
        while let Some(c) = self.current() {
            if !self.is_unquoted_char(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        Token::new(TokenKind::String, Some(text), Span::new(start, self.cursor))
    }

    fn read_quoted(&mut self, quote: char) -> Result<Token, SyntaxError> {
        let start = self.cursor;
        self.advance();

        let unterminated =
            || SyntaxError::at("Unexpected end of input when processing string", start);

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut literal_start = self.cursor;

        let literal_end = loop {
            let here = self.cursor;
            let c = self.advance().ok_or_else(unterminated)?;

            if c == quote {
                break here;
            }
            match c {
                '\\' => {
                    let escaped = self.advance().ok_or_else(unterminated)?;
                    literal.push(escaped);
                }
                '{' => {
                    pieces.push(Token::new(
                        TokenKind::String,
                        Some(mem::take(&mut literal)),
                        Span::new(literal_start, here),
                    ));

                    let (inner, end) = InterpolationLexer::new(self.input, self.cursor).tokenize()?;
                    self.cursor = end;
                    if self.current() != Some('}') {
                        return Err(SyntaxError::at(
                            "Unexpected end of input when processing string interpolation",
                            here,
                        ));
                    }
                    self.advance();

                    pieces.push(Token::with_payload(
                        TokenKind::StringInterpolation,
                        inner,
                        Span::new(here, self.cursor),
                    ));
                    literal_start = self.cursor;
                }
                other => literal.push(other),
            }
        };

        let span = Span::new(start, self.cursor);
        if pieces.is_empty() {
            return Ok(Token::new(TokenKind::String, Some(literal), span).quoted());
        }

        pieces.push(Token::new(
            TokenKind::String,
            Some(literal),
            Span::new(literal_start, literal_end),
        ));
        Ok(Token::with_payload(TokenKind::String, pieces, span).quoted())
    }
}
