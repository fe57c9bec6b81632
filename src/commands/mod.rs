// src/commands/mod.rs
pub mod cd_cmd;
pub mod clear_cmd;
pub mod echo;
pub mod exit_cmd;
pub mod pwd;
pub mod registry;
pub mod reset_config_cmd;
pub mod split_cmd;
pub mod types;

pub use registry::CommandRegistry;
pub use types::{Command, CommandContext, CommandResult};

/// Serialises tests that read or change the process working directory.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
