//! Evaluation Errors
//!
//! Raised by leaf operations (process spawn, variable access, device I/O).
//! A failing exit code is not an error: it travels up as a `ShellResult`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("'{name}' is not a known command or executable file")]
    ProgramNotFound {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid variable scope '{0}'")]
    UnknownVariableScope(String),

    #[error("Unknown config variable '{0}'")]
    UnknownConfigVariable(String),

    #[error("Variable '{name}' is not set in scope '{scope}'")]
    UnknownVariable { scope: String, name: String },

    #[error("'{0}' is not a valid environment variable name")]
    InvalidVariableName(String),

    #[error("The value for environment variable '{0}' contains a NUL character")]
    InvalidVariableValue(String),

    #[error("Invalid value '{value}' for '{name}', expected {expected}")]
    InvalidConfigValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Unexpected argument shape: {0}")]
    UnexpectedArgumentShape(String),

    #[error("Opening special device '{0}' is not supported, only NUL is allowed")]
    DeviceUnsupported(String),

    #[error("Could not find device '{0}'")]
    DeviceNotFound(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Raised by `exit`; the host stops with this code.
    #[error("exit {0}")]
    Exit(i32),
}

impl EvalError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
