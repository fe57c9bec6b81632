// src/commands/types.rs
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::interpreter::errors::EvalError;
use crate::interpreter::result::{ShellResult, Value};

/// Built-ins return a result like any other segment; `Err` is reserved for
/// `exit` and for failures that should abort the whole line.
pub type CommandResult = Result<ShellResult, EvalError>;

/// Everything a built-in sees: its flattened arguments, the piped-in value
/// and the shell configuration.
pub struct CommandContext<'a> {
    pub args: Vec<String>,
    pub input: Value,
    pub config: &'a mut AppConfig,
}

impl<'a> CommandContext<'a> {
    pub fn new(args: Vec<String>, input: Value, config: &'a mut AppConfig) -> Self {
        Self {
            args,
            input,
            config,
        }
    }
}

#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult;
}
