//! Parser Types
//!
//! The error shared by the lexer and the parser. A line that fails to lex or
//! parse is rejected as a whole before anything executes.

use std::fmt;
use thiserror::Error;

use crate::parser::token::{Location, Span, Token};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.span.start.line, self.span.start.column, self.message
        )
    }
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self::new(message, Span::at(location))
    }

    pub fn with_token(message: impl Into<String>, token: &Token) -> Self {
        Self::new(message, token.span)
    }
}
