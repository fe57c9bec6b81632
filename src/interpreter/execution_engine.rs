//! Execution Engine
//!
//! Evaluates a parsed [`Segment`] tree. Every segment takes the shell
//! configuration, an optional input value and a capture flag, and produces
//! a [`ShellResult`]:
//!
//! - Command: resolve the head, flatten the arguments, then dispatch to a
//!   built-in or spawn a process
//! - Pipe: left runs captured, its value becomes the right side's input
//! - Sequence: both sides run independently
//! - Redirection: read a device into the left side, or write its output out
//! - StringInterpolation / CommandInterpolation / Variable / Text: values
//!
//! A non-zero exit code is a normal result and short-circuits pipes,
//! stop-on-failure sequences and argument lists. Errors are reserved for
//! failures of leaf operations and abort the whole line.

use std::future::Future;
use std::pin::Pin;

use tracing::trace;

use crate::ast::types::{RedirectionMode, Segment};
use crate::commands::{CommandContext, CommandRegistry};
use crate::config::AppConfig;
use crate::interpreter::errors::EvalError;
use crate::interpreter::process::run_process;
use crate::interpreter::redirections::{read_device, select_lines, write_device};
use crate::interpreter::result::{ShellResult, Value};
use crate::interpreter::variables::{get_variable, set_variable, VariableScope, WatcherRegistry};

pub type EvalFuture<'f> = Pin<Box<dyn Future<Output = Result<ShellResult, EvalError>> + Send + 'f>>;

/// Receives output that would otherwise be dropped, such as the value of the
/// left side of a `;` sequence.
pub trait OutputSink: Send + Sync {
    fn emit(&self, value: &Value);
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Absent => "no value",
        Value::Scalar(_) => "a string",
        Value::Lines(_) => "a list of lines",
        Value::Streams(_) => "separate output streams",
    }
}

/// Evaluates segments against a command table and a set of variable watchers.
pub struct ExecutionEngine<'a> {
    commands: &'a CommandRegistry,
    watchers: &'a WatcherRegistry,
    sink: Option<&'a dyn OutputSink>,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(commands: &'a CommandRegistry, watchers: &'a WatcherRegistry) -> Self {
        Self {
            commands,
            watchers,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn OutputSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Evaluate `segment`. `input` is the value piped in, `capture` asks for
    /// process output to be collected instead of going to the console.
    pub fn execute<'f>(
        &'f self,
        config: &'f mut AppConfig,
        segment: &'f Segment,
        input: Value,
        capture: bool,
    ) -> EvalFuture<'f> {
        Box::pin(async move {
            match segment {
                Segment::Text { value } => Ok(ShellResult::scalar(value.clone())),
                Segment::Command { head, args } => {
                    self.execute_command(config, head, args.as_deref(), input, capture)
                        .await
                }
                Segment::Pipe { left, right } => {
                    let left_result = self.execute(config, left, input, true).await?;
                    if !left_result.is_success() {
                        return Ok(left_result);
                    }
                    self.execute(config, right, left_result.value, capture).await
                }
                Segment::Sequence {
                    left,
                    right,
                    stop_on_failure,
                } => {
                    let left_result = self.execute(config, left, Value::Absent, false).await?;
                    if *stop_on_failure && !left_result.is_success() {
                        trace!(exit_code = left_result.exit_code, "sequence stopped");
                        return Ok(left_result);
                    }
                    if let Some(sink) = self.sink {
                        if !left_result.value.is_absent() {
                            sink.emit(&left_result.value);
                        }
                    }
                    self.execute(config, right, Value::Absent, false).await
                }
                Segment::Redirection { left, device, mode } => {
                    self.execute_redirection(config, left, device, *mode, input, capture)
                        .await
                }
                Segment::StringInterpolation { parts } => {
                    let mut text = String::new();
                    for part in parts {
                        let result = self.execute(config, part, Value::Absent, true).await?;
                        if !result.is_success() {
                            return Ok(result);
                        }
                        text.push_str(&result.value.contribution());
                    }
                    Ok(ShellResult::scalar(text))
                }
                Segment::CommandInterpolation { inner } => {
                    self.execute(config, inner, input, capture).await
                }
                Segment::Variable { scope, name } => {
                    let scope = VariableScope::resolve(scope.as_deref(), config)?;
                    if input.is_absent() {
                        return Ok(ShellResult::success(get_variable(config, scope, name)?));
                    }

                    let value = input.joined();
                    set_variable(config, self.watchers, scope, name, &value)?;
                    Ok(if capture {
                        ShellResult::scalar(value)
                    } else {
                        ShellResult::absent()
                    })
                }
            }
        })
    }

    async fn execute_command(
        &self,
        config: &mut AppConfig,
        head: &Segment,
        args: Option<&[Segment]>,
        input: Value,
        capture: bool,
    ) -> Result<ShellResult, EvalError> {
        let head_result = self.execute(config, head, Value::Absent, true).await?;
        let name = match head_result.value {
            Value::Scalar(name) if head_result.exit_code == 0 => name,
            other => {
                return Err(EvalError::UnexpectedArgumentShape(format!(
                    "a command name must be a single string, found {}",
                    shape(&other)
                )))
            }
        };

        let mut arguments = Vec::new();
        for arg in args.unwrap_or_default() {
            let result = self.execute(config, arg, Value::Absent, true).await?;
            if !result.is_success() {
                return Ok(result);
            }
            arguments.extend(result.value.arguments());
        }

        if let Some(command) = self.commands.get(&name) {
            if !config.is_command_disabled(&name) && !config.is_command_disabled(command.name()) {
                trace!(command = command.name(), ?arguments, "running built-in");
                return command
                    .execute(CommandContext::new(arguments, input, config))
                    .await;
            }
            trace!(command = command.name(), "built-in disabled, falling through");
        }

        let input = if input.is_absent() {
            None
        } else {
            Some(input.lines())
        };
        run_process(&name, &arguments, input, capture).await
    }

    async fn execute_redirection(
        &self,
        config: &mut AppConfig,
        left: &Segment,
        device: &Segment,
        mode: RedirectionMode,
        input: Value,
        capture: bool,
    ) -> Result<ShellResult, EvalError> {
        let device_result = self.execute(config, device, Value::Absent, true).await?;
        if !device_result.is_success() {
            return Ok(device_result);
        }
        let path = match device_result.value {
            Value::Scalar(path) => path,
            other => {
                return Err(EvalError::UnexpectedArgumentShape(format!(
                    "a redirection device must be a single string, found {}",
                    shape(&other)
                )))
            }
        };

        if mode == RedirectionMode::StdIn {
            let lines = read_device(&path).await?;
            return self.execute(config, left, Value::Lines(lines), capture).await;
        }

        let result = self.execute(config, left, input, true).await?;
        if !result.is_success() {
            return Ok(result);
        }
        write_device(&path, &select_lines(&result.value, mode)).await?;
        Ok(ShellResult::absent())
    }
}
