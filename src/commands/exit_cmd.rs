// src/commands/exit_cmd.rs
use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::interpreter::errors::EvalError;
use crate::interpreter::result::ShellResult;

/// Stops the shell. The host catches `EvalError::Exit`.
pub struct ExitCommand;

#[async_trait]
impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult {
        let Some(code) = ctx.args.first() else {
            return Err(EvalError::Exit(0));
        };
        match code.trim().parse::<i32>() {
            Ok(code) => Err(EvalError::Exit(code)),
            Err(_) => Ok(ShellResult::error(format!(
                "exit: '{}' is not a valid exit code",
                code
            ))),
        }
    }
}
