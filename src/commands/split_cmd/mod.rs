// src/commands/split_cmd/mod.rs
use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::interpreter::result::{ShellResult, Value};

/// `split <text> <separator>` splits the text.
/// `split <separator>` splits every input line instead.
/// `--no-empty` (`-n`) drops empty pieces.
pub struct SplitCommand;

fn split_text(text: &str, separator: &str, no_empty: bool) -> Vec<String> {
    let pieces: Vec<String> = if separator.is_empty() {
        vec![text.to_string()]
    } else {
        text.split(separator).map(str::to_string).collect()
    };
    if no_empty {
        pieces.into_iter().filter(|piece| !piece.is_empty()).collect()
    } else {
        pieces
    }
}

#[async_trait]
impl Command for SplitCommand {
    fn name(&self) -> &'static str {
        "split"
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult {
        let mut no_empty = false;
        let mut positional = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "--no-empty" | "-n" => no_empty = true,
                _ => positional.push(arg.as_str()),
            }
        }

        let pieces = match positional.as_slice() {
            [] => return Ok(ShellResult::error("split: missing text to split")),
            [separator] => ctx
                .input
                .lines()
                .iter()
                .flat_map(|line| split_text(line, separator, no_empty))
                .collect(),
            [text, separator, ..] => split_text(text, separator, no_empty),
        };
        Ok(ShellResult::success(Value::Lines(pieces)))
    }
}
