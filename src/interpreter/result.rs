//! Shell Results
//!
//! The outcome of evaluating any segment: an exit code plus an output value.
//! Results are the only channel segments use to pass data to each other.

use serde::Serialize;

/// Separately captured output of an external process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandardStreams {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl StandardStreams {
    pub fn new(stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self { stdout, stderr }
    }
}

/// Output value of a segment. Serializes untagged: `null`, a string, an
/// array of strings, or `{stdout, stderr}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Absent,
    Scalar(String),
    Lines(Vec<String>),
    Streams(StandardStreams),
}

impl Value {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The value as lines: stdout for streams, nothing for absent.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Absent => Vec::new(),
            Self::Scalar(s) => vec![s.clone()],
            Self::Lines(lines) => lines.clone(),
            Self::Streams(streams) => streams.stdout.clone(),
        }
    }

    /// Newline-joined text, used for stdin and variable writes.
    pub fn joined(&self) -> String {
        self.lines().join("\n")
    }

    /// What this value adds to a string interpolation.
    pub fn contribution(&self) -> String {
        self.lines().concat()
    }

    /// What this value adds to a command's argument list. Absent counts as
    /// one empty argument.
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Self::Absent => vec![String::new()],
            other => other.lines(),
        }
    }
}

/// Result of evaluating a segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellResult {
    pub exit_code: i32,
    pub value: Value,
}

impl ShellResult {
    pub fn new(exit_code: i32, value: Value) -> Self {
        Self { exit_code, value }
    }

    pub fn success(value: Value) -> Self {
        Self::new(0, value)
    }

    pub fn absent() -> Self {
        Self::success(Value::Absent)
    }

    pub fn scalar(value: impl Into<String>) -> Self {
        Self::success(Value::scalar(value))
    }

    /// Exit code 1 with the message on the error stream.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_exit_code(1, Vec::new(), vec![message.into()])
    }

    pub fn with_exit_code(exit_code: i32, stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self::new(exit_code, Value::Streams(StandardStreams::new(stdout, stderr)))
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
