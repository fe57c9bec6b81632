//! Shell Environment
//!
//! Host facade tying the lexer, parser and execution engine together. A line
//! is lexed and parsed completely before anything runs.

use thiserror::Error;
use tracing::{debug, warn};

use crate::ast::printer::print_tree;
use crate::ast::types::Segment;
use crate::commands::CommandRegistry;
use crate::config::AppConfig;
use crate::interpreter::{EvalError, ExecutionEngine, OutputSink, ShellResult, Value, WatcherRegistry};
use crate::parser::{Lexer, Parser, SyntaxError, Token};

pub const PRINT_TOKENS_VARIABLE: &str = "__PRINT_TOKENS";
pub const PRINT_TREE_VARIABLE: &str = "__PRINT_TREE";
pub const NO_EXECUTE_VARIABLE: &str = "__NO_EXECUTE";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Debug switches. Each is also enabled by setting the matching temporary
/// variable to `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellOptions {
    pub print_tokens: bool,
    pub print_tree: bool,
    pub no_execute: bool,
}

/// Result of one line plus any debug dumps it asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub result: ShellResult,
    pub diagnostics: Vec<String>,
}

pub struct Shell {
    config: AppConfig,
    commands: CommandRegistry,
    watchers: WatcherRegistry,
    options: ShellOptions,
    sink: Option<Box<dyn OutputSink>>,
}

impl Shell {
    pub fn new(mut config: AppConfig, commands: CommandRegistry) -> Self {
        for name in [PRINT_TOKENS_VARIABLE, PRINT_TREE_VARIABLE, NO_EXECUTE_VARIABLE] {
            if !config.temporary.contains(name) {
                config.temporary.set(name, "false");
            }
        }
        Self {
            config,
            commands,
            watchers: WatcherRegistry::new(),
            options: ShellOptions::default(),
            sink: None,
        }
    }

    pub fn with_options(mut self, options: ShellOptions) -> Self {
        self.options = options;
        self
    }

    /// Where the left-hand output of `;` and `&` sequences goes.
    pub fn with_output_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn has_output_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn watchers_mut(&mut self) -> &mut WatcherRegistry {
        &mut self.watchers
    }

    pub fn tokenize(&self, line: &str) -> Result<Vec<Token>, SyntaxError> {
        Lexer::new(line).tokenize()
    }

    pub fn parse(&self, line: &str) -> Result<Segment, SyntaxError> {
        Parser::new(self.tokenize(line)?).parse_all()
    }

    fn flag(&self, name: &str) -> bool {
        self.config
            .temporary
            .get(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Run one line with no input and output going to the console.
    pub async fn exec(&mut self, line: &str) -> Result<ExecOutcome, ShellError> {
        if line.trim().is_empty() {
            return Ok(ExecOutcome::default());
        }

        let print_tokens = self.options.print_tokens || self.flag(PRINT_TOKENS_VARIABLE);
        let show_tree = self.options.print_tree || self.flag(PRINT_TREE_VARIABLE);
        let no_execute = self.options.no_execute || self.flag(NO_EXECUTE_VARIABLE);

        let tokens = self.tokenize(line)?;
        let mut diagnostics = Vec::new();
        if print_tokens {
            diagnostics.extend(tokens.iter().map(Token::to_string));
        }

        let segment = Parser::new(tokens).parse_all()?;
        if show_tree {
            diagnostics.push(print_tree(&segment));
        }
        debug!(segment = %segment, "parsed line");

        if no_execute {
            return Ok(ExecOutcome {
                result: ShellResult::absent(),
                diagnostics,
            });
        }

        let mut engine = ExecutionEngine::new(&self.commands, &self.watchers);
        if let Some(sink) = self.sink.as_deref() {
            engine = engine.with_sink(sink);
        }
        let result = engine
            .execute(&mut self.config, &segment, Value::Absent, false)
            .await
            .inspect_err(|err| warn!(error = %err, "evaluation failed"))?;

        debug!(exit_code = result.exit_code, "line finished");
        Ok(ExecOutcome { result, diagnostics })
    }

    /// The offending source line with a caret under the error position.
    pub fn render_error(line: &str, error: &SyntaxError) -> String {
        let start = error.span.start;
        let source = line
            .lines()
            .nth(start.line.saturating_sub(1))
            .unwrap_or_default();
        let padding = " ".repeat(start.column.saturating_sub(1));
        let underline = "─".repeat(error.span.len());
        format!(
            "{}\n{}^{}┘ {}",
            source, padding, underline, error.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn shell() -> Shell {
        Shell::new(AppConfig::default(), CommandRegistry::with_builtins())
    }

    #[tokio::test]
    async fn test_blank_line() {
        let mut shell = shell();
        let outcome = shell.exec("   ").await.unwrap();
        assert_eq!(outcome, ExecOutcome::default());
    }

    #[tokio::test]
    async fn test_exec_builtin() {
        let mut shell = shell();
        let outcome = shell.exec("echo hello").await.unwrap();
        assert_eq!(outcome.result, ShellResult::scalar("hello"));
        assert!(outcome.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_syntax_error_runs_nothing() {
        let mut shell = shell();
        let err = shell.exec("echo hi | $tmp:x ; \"abc").await.unwrap_err();
        let ShellError::Syntax(err) = err else {
            panic!("expected a syntax error");
        };
        assert_eq!(err.span.start.column, 20);
        assert!(!shell.config().temporary.contains("x"));
    }

    #[tokio::test]
    async fn test_debug_variables_are_preinitialised() {
        let mut shell = shell();
        let outcome = shell.exec("$tmp:__NO_EXECUTE").await.unwrap();
        assert_eq!(outcome.result, ShellResult::scalar("false"));
    }

    #[tokio::test]
    async fn test_no_execute_via_variable() {
        let mut shell = shell();
        shell.exec("echo true | $tmp:__print_tree").await.unwrap();
        shell.exec("echo true | $tmp:__no_execute").await.unwrap();

        let outcome = shell.exec("echo hi | $tmp:x").await.unwrap();
        assert_eq!(outcome.result, ShellResult::absent());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].starts_with("Pipe"));
        assert!(!shell.config().temporary.contains("x"));

        // Lines that would switch execution back on are not executed either
        shell.exec("echo false | $tmp:__no_execute").await.unwrap();
        assert_eq!(
            shell.config().temporary.get(NO_EXECUTE_VARIABLE),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_print_tokens_option() {
        let mut shell = shell().with_options(ShellOptions {
            print_tokens: true,
            no_execute: true,
            ..ShellOptions::default()
        });
        let outcome = shell.exec("echo a").await.unwrap();
        // echo, a, end of input
        assert_eq!(outcome.diagnostics.len(), 3);
    }

    #[tokio::test]
    async fn test_eval_error_surfaces() {
        let mut shell = shell();
        let err = shell.exec("$nope:x").await.unwrap_err();
        assert!(matches!(err, ShellError::Eval(EvalError::UnknownVariableScope(_))));
    }

    struct Collect(Arc<Mutex<Vec<Value>>>);

    impl OutputSink for Collect {
        fn emit(&self, value: &Value) {
            self.0.lock().unwrap().push(value.clone());
        }
    }

    #[tokio::test]
    async fn test_output_sink_receives_sequence_output() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut shell = shell().with_output_sink(Collect(seen.clone()));
        let outcome = shell.exec("echo a ; echo b").await.unwrap();
        assert_eq!(outcome.result, ShellResult::scalar("b"));
        assert_eq!(*seen.lock().unwrap(), vec![Value::scalar("a")]);
    }

    #[tokio::test]
    async fn test_exit_propagates() {
        let mut shell = shell();
        let err = shell.exec("exit 3").await.unwrap_err();
        assert!(matches!(err, ShellError::Eval(EvalError::Exit(3))));
    }

    #[test]
    fn test_render_error() {
        let line = "echo \"abc";
        let err = Lexer::new(line).tokenize().unwrap_err();
        let rendered = Shell::render_error(line, &err);
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("echo \"abc"));
        assert_eq!(
            lines.next(),
            Some("     ^┘ Unexpected end of input when processing string")
        );
    }
}
