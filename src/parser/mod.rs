//! Parser module for lumi command lines
//!
//! This module contains the lexer and the precedence-climbing parser.

pub mod token;
pub mod types;
pub mod lexer;
pub mod parser;

// Re-exports
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::{Location, Span, Token, TokenKind};
pub use types::SyntaxError;
