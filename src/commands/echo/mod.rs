// src/commands/echo/mod.rs
use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::interpreter::result::ShellResult;

/// Joins its arguments and then any input lines with single spaces.
pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult {
        let mut words = ctx.args;
        words.extend(ctx.input.lines());
        Ok(ShellResult::scalar(words.join(" ")))
    }
}
