//! lumi - an interactive command shell
//!
//! Lines are lexed and parsed into a [`Segment`] tree, then evaluated
//! against built-in commands, external processes, redirection devices and
//! scoped variables.

pub mod ast;
pub mod commands;
pub mod config;
pub mod interpreter;
pub mod parser;
pub mod shell;

pub use ast::types::*;
pub use commands::CommandRegistry;
pub use config::AppConfig;
pub use interpreter::{EvalError, OutputSink, ShellResult, StandardStreams, Value};
pub use parser::{parse, Parser, SyntaxError};
pub use shell::{ExecOutcome, Shell, ShellError, ShellOptions};
