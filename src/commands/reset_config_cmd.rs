// src/commands/reset_config_cmd.rs
use async_trait::async_trait;
use tracing::info;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::interpreter::result::ShellResult;

/// Restores the default configuration and saves it.
pub struct ResetConfigCommand;

#[async_trait]
impl Command for ResetConfigCommand {
    fn name(&self) -> &'static str {
        "reset-config"
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult {
        ctx.config.reset()?;
        info!("configuration reset to defaults");
        Ok(ShellResult::absent())
    }
}
