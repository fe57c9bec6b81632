// src/commands/pwd/mod.rs
use std::env;

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::interpreter::errors::EvalError;
use crate::interpreter::helpers::tilde::{abbreviate_home, home_dir};
use crate::interpreter::result::ShellResult;

/// Prints the working directory, abbreviating home as `~` when `use_tilde`
/// is on and `-e`/`--expand-tilde` is not given.
pub struct PwdCommand;

#[async_trait]
impl Command for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult {
        let expand = ctx
            .args
            .iter()
            .any(|arg| arg == "-e" || arg == "--expand-tilde");

        let cwd = env::current_dir().map_err(|source| EvalError::io(".", source))?;

        if ctx.config.use_tilde && !expand {
            if let Some(home) = home_dir() {
                return Ok(ShellResult::scalar(abbreviate_home(&home, &cwd)));
            }
        }
        Ok(ShellResult::scalar(cwd.display().to_string()))
    }
}
