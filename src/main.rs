use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lumi::interpreter::helpers::tilde::{abbreviate_home, home_dir};
use lumi::{AppConfig, CommandRegistry, EvalError, OutputSink, Shell, ShellError, ShellOptions, ShellResult, Value};

#[derive(Parser)]
#[command(name = "lumi")]
#[command(about = "An interactive command shell")]
#[command(version)]
struct Cli {
    /// Run one line and exit with its exit code
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Print the tokens of every line
    #[arg(short = 't', long = "tokens")]
    tokens: bool,

    /// Print the parsed tree of every line
    #[arg(short = 'T', long = "tree")]
    tree: bool,

    /// Parse lines without running them
    #[arg(short = 'E', long = "no-execute")]
    no_execute: bool,

    /// Configuration file (defaults to lumi.toml in the user config directory)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Output results as JSON (value, exitCode)
    #[arg(long = "json")]
    json: bool,
}

/// Prints values to the console as they are produced.
struct Console;

impl OutputSink for Console {
    fn emit(&self, value: &Value) {
        print_value(value);
    }
}

fn print_value(value: &Value) {
    match value {
        Value::Absent => {}
        Value::Scalar(text) => println!("{}", text),
        Value::Lines(lines) => lines.iter().for_each(|line| println!("{}", line)),
        Value::Streams(streams) => {
            streams.stdout.iter().for_each(|line| println!("{}", line));
            streams.stderr.iter().for_each(|line| eprintln!("{}", line));
        }
    }
}

fn print_result(result: &ShellResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else {
        print_value(&result.value);
    }
    Ok(())
}

enum LineOutcome {
    Continue(i32),
    Exit(i32),
}

async fn run_line(shell: &mut Shell, line: &str, json: bool) -> Result<LineOutcome> {
    match shell.exec(line).await {
        Ok(outcome) => {
            outcome.diagnostics.iter().for_each(|d| eprintln!("{}", d));
            print_result(&outcome.result, json)?;
            Ok(LineOutcome::Continue(outcome.result.exit_code))
        }
        Err(ShellError::Eval(EvalError::Exit(code))) => Ok(LineOutcome::Exit(code)),
        Err(ShellError::Syntax(err)) => {
            eprintln!("{}", Shell::render_error(line, &err));
            Ok(LineOutcome::Continue(1))
        }
        Err(ShellError::Eval(err)) => {
            eprintln!("{}", err);
            Ok(LineOutcome::Continue(1))
        }
    }
}

fn prompt(config: &AppConfig) -> String {
    let user = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string());
    let dir = match (env::current_dir(), home_dir()) {
        (Ok(cwd), Some(home)) if config.use_tilde => abbreviate_home(&home, &cwd),
        (Ok(cwd), _) => cwd.display().to_string(),
        (Err(_), _) => "?".to_string(),
    };
    format!("{}@{}> ", user, dir)
}

fn history_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lumi").map(|dirs| dirs.data_dir().join("history.txt"))
}

async fn interactive(shell: &mut Shell, json: bool) -> Result<i32> {
    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history = history_path();
    if let Some(path) = &history {
        if let Err(e) = rl.load_history(path) {
            let is_not_found =
                matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
            if !is_not_found {
                tracing::warn!("Failed to load history: {}", e);
            }
        }
    }

    let mut exit_code = 0;
    loop {
        match rl.readline(&prompt(shell.config())) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = rl.add_history_entry(line.as_str()) {
                        tracing::warn!("Failed to add history entry: {}", e);
                    }
                }
                match run_line(shell, &line, json).await? {
                    LineOutcome::Continue(code) => exit_code = code,
                    LineOutcome::Exit(code) => {
                        exit_code = code;
                        break;
                    }
                }
            }
            // Ctrl-C only discards the current line
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create history directory: {}", e);
            }
        }
        if let Err(e) = rl.save_history(path) {
            tracing::warn!("Failed to save history: {}", e);
        }
    }
    Ok(exit_code)
}

/// Under `--json` only the final result of a line is printed, so stdout
/// stays one JSON object per line.
fn build_shell(cli: &Cli, config: AppConfig) -> Shell {
    let shell = Shell::new(config, CommandRegistry::with_builtins()).with_options(ShellOptions {
        print_tokens: cli.tokens,
        print_tree: cli.tree,
        no_execute: cli.no_execute,
    });
    if cli.json {
        shell
    } else {
        shell.with_output_sink(Console)
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => AppConfig::default_path()?,
    };
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let mut shell = build_shell(&cli, config);

    match cli.eval {
        Some(line) => match run_line(&mut shell, &line, cli.json).await? {
            LineOutcome::Continue(code) | LineOutcome::Exit(code) => Ok(code),
        },
        None => interactive(&mut shell, cli.json).await,
    }
}

#[tokio::main]
async fn main() {
    // Respects RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}
