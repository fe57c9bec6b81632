//! Abstract Syntax Tree (AST) for lumi command lines
//!
//! Architecture:
//!   Input → Lexer → Parser → Segment tree → Execution engine → ShellResult

pub mod printer;
pub mod types;
