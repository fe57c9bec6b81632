// src/commands/registry.rs
use std::collections::HashMap;

use super::types::Command;

/// Built-in command table, looked up before spawning a process.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    /// Alias -> primary name
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// A registry holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        for alias in cmd.aliases() {
            self.aliases.insert(alias.to_string(), cmd.name().to_string());
        }
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Find a command by its name or one of its aliases.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        let primary = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.commands.get(primary).map(|c| c.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use super::cd_cmd::CdCommand;
use super::clear_cmd::ClearCommand;
use super::echo::EchoCommand;
use super::exit_cmd::ExitCommand;
use super::pwd::PwdCommand;
use super::reset_config_cmd::ResetConfigCommand;
use super::split_cmd::SplitCommand;

/// Register every built-in command.
pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register(Box::new(EchoCommand));
    registry.register(Box::new(CdCommand));
    registry.register(Box::new(PwdCommand));
    registry.register(Box::new(ExitCommand));
    registry.register(Box::new(ClearCommand));
    registry.register(Box::new(SplitCommand));
    registry.register(Box::new(ResetConfigCommand));
}
