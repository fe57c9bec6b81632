// src/commands/clear_cmd.rs
use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::interpreter::result::ShellResult;

/// ANSI: clear the screen and move the cursor to the top-left corner
pub const CLEAR_SEQUENCE: &str = "\x1B[2J\x1B[H";

pub struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["cls"]
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help") {
            return Ok(ShellResult::scalar(
                "clear - clear the terminal screen\n\nUsage: clear\n\nAlias: cls",
            ));
        }
        Ok(ShellResult::scalar(CLEAR_SEQUENCE))
    }
}
