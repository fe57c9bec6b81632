//! Interpreter module
//!
//! Evaluates parsed segments: built-in dispatch, external processes,
//! redirections and variable scopes.

pub mod errors;
pub mod execution_engine;
pub mod helpers;
pub mod process;
pub mod redirections;
pub mod result;
pub mod variables;

pub use errors::EvalError;
pub use execution_engine::{ExecutionEngine, OutputSink};
pub use result::{ShellResult, StandardStreams, Value};
pub use variables::{VariableChange, VariableScope, WatchDecision, WatcherRegistry};
