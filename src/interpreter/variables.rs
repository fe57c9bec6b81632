//! Variable Scopes
//!
//! Resolves `$scope:name` references to a backing store and runs the
//! watcher chain that may veto a write.
//!
//! | scope        | aliases                            | backing                       |
//! |--------------|------------------------------------|-------------------------------|
//! | `config`     | `cfg`, `conf`                      | config property registry      |
//! | `system`     | `sys`                              | environment                   |
//! | `user`       | `usr`                              | environment                   |
//! | `persistent` | `pers`, `persist`                  | `AppConfig::persistent`, saved|
//! | `temporary`  | `tmp`, `temp`                      | `AppConfig::temporary`        |
//! | `process`    | `proc`, `env`, `environment`       | environment                   |
//!
//! The standard library only exposes the process environment, so `system`
//! and `user` read and write the same variables as `process`.

use std::collections::HashMap;
use std::env;
use std::fmt;

use tracing::{debug, trace};

use crate::config::{properties, AppConfig};
use crate::interpreter::errors::EvalError;
use crate::interpreter::result::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableScope {
    Config,
    System,
    User,
    Persistent,
    Temporary,
    Process,
}

impl VariableScope {
    /// Normalise a scope name or alias, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cfg" | "conf" | "config" => Some(Self::Config),
            "sys" | "system" => Some(Self::System),
            "usr" | "user" => Some(Self::User),
            "pers" | "persist" | "persistent" => Some(Self::Persistent),
            "tmp" | "temp" | "temporary" => Some(Self::Temporary),
            "proc" | "process" | "env" | "environment" => Some(Self::Process),
            _ => None,
        }
    }

    /// Scope for a variable reference: the explicit scope, else the
    /// configured default, else `temporary`.
    pub fn resolve(scope: Option<&str>, config: &AppConfig) -> Result<Self, EvalError> {
        match scope.or(config.default_variable_scope.as_deref()) {
            Some(name) => {
                Self::from_name(name).ok_or_else(|| EvalError::UnknownVariableScope(name.to_string()))
            }
            None => Ok(Self::Temporary),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::System => "system",
            Self::User => "user",
            Self::Persistent => "persistent",
            Self::Temporary => "temporary",
            Self::Process => "process",
        }
    }

    fn is_environment(&self) -> bool {
        matches!(self, Self::System | Self::User | Self::Process)
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WATCHERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchDecision {
    Continue,
    Revert,
}

/// A completed write, as seen by a watcher.
#[derive(Debug, Clone, Copy)]
pub struct VariableChange<'a> {
    pub scope: VariableScope,
    pub name: &'a str,
    pub old_value: Option<&'a str>,
    pub new_value: &'a str,
    /// An earlier watcher already reverted this write
    pub reverted: bool,
}

pub type Watcher = Box<dyn Fn(&VariableChange<'_>) -> WatchDecision + Send + Sync>;

/// Callbacks keyed by variable name (ASCII case-insensitive), in
/// registration order.
#[derive(Default)]
pub struct WatcherRegistry {
    watchers: HashMap<String, Vec<Watcher>>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch<F>(&mut self, name: &str, watcher: F)
    where
        F: Fn(&VariableChange<'_>) -> WatchDecision + Send + Sync + 'static,
    {
        self.watchers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(Box::new(watcher));
    }

    /// Run every watcher for the change. Returns true if any asked to revert.
    /// Only the first revert counts; later watchers still run and see
    /// `reverted` set.
    pub fn notify(&self, change: VariableChange<'_>) -> bool {
        let Some(watchers) = self.watchers.get(&change.name.to_ascii_lowercase()) else {
            return false;
        };

        let mut reverted = false;
        for watcher in watchers {
            let decision = watcher(&VariableChange { reverted, ..change });
            if decision == WatchDecision::Revert && !reverted {
                reverted = true;
            }
        }
        reverted
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

fn is_valid_env_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

/// Read a variable. Unset environment variables are `Absent`; unset stored
/// variables are an error.
pub fn get_variable(config: &AppConfig, scope: VariableScope, name: &str) -> Result<Value, EvalError> {
    trace!(%scope, name, "reading variable");
    match scope {
        VariableScope::Config => {
            let property = properties::find(name)
                .ok_or_else(|| EvalError::UnknownConfigVariable(name.to_string()))?;
            Ok(Value::Scalar((property.get)(config)))
        }
        VariableScope::Persistent => stored(config.persistent.get(name), scope, name),
        VariableScope::Temporary => stored(config.temporary.get(name), scope, name),
        VariableScope::System | VariableScope::User | VariableScope::Process => {
            if !is_valid_env_name(name) {
                return Ok(Value::Absent);
            }
            Ok(env::var_os(name)
                .map(|value| Value::Scalar(value.to_string_lossy().into_owned()))
                .unwrap_or(Value::Absent))
        }
    }
}

fn stored(value: Option<&str>, scope: VariableScope, name: &str) -> Result<Value, EvalError> {
    value
        .map(Value::scalar)
        .ok_or_else(|| EvalError::UnknownVariable {
            scope: scope.to_string(),
            name: name.to_string(),
        })
}

fn current_value(config: &AppConfig, scope: VariableScope, name: &str) -> Option<String> {
    match get_variable(config, scope, name) {
        Ok(Value::Scalar(value)) => Some(value),
        _ => None,
    }
}

/// Write or remove a value without notifying watchers.
fn write_raw(
    config: &mut AppConfig,
    scope: VariableScope,
    name: &str,
    value: Option<&str>,
) -> Result<(), EvalError> {
    match (scope, value) {
        (VariableScope::Config, Some(value)) => {
            let property = properties::find(name)
                .ok_or_else(|| EvalError::UnknownConfigVariable(name.to_string()))?;
            (property.set)(config, value)
        }
        // Config properties always hold a value
        (VariableScope::Config, None) => Ok(()),
        (VariableScope::Persistent, Some(value)) => {
            config.persistent.set(name, value);
            Ok(())
        }
        (VariableScope::Persistent, None) => {
            config.persistent.remove(name);
            Ok(())
        }
        (VariableScope::Temporary, Some(value)) => {
            config.temporary.set(name, value);
            Ok(())
        }
        (VariableScope::Temporary, None) => {
            config.temporary.remove(name);
            Ok(())
        }
        (scope, value) => {
            if scope != VariableScope::Process {
                debug!(%scope, name, "no separate {} environment, using the process environment", scope);
            }
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
            Ok(())
        }
    }
}

/// Write a variable, let watchers veto it, and save the config when a
/// saved setting changed.
pub fn set_variable(
    config: &mut AppConfig,
    watchers: &WatcherRegistry,
    scope: VariableScope,
    name: &str,
    value: &str,
) -> Result<(), EvalError> {
    if scope.is_environment() && !is_valid_env_name(name) {
        return Err(EvalError::InvalidVariableName(name.to_string()));
    }
    if scope.is_environment() && value.contains('\0') {
        return Err(EvalError::InvalidVariableValue(name.to_string()));
    }

    let old_value = current_value(config, scope, name);
    write_raw(config, scope, name, Some(value))?;

    let reverted = watchers.notify(VariableChange {
        scope,
        name,
        old_value: old_value.as_deref(),
        new_value: value,
        reverted: false,
    });

    if reverted {
        debug!(%scope, name, "variable write reverted by watcher");
        write_raw(config, scope, name, old_value.as_deref())?;
    } else {
        debug!(%scope, name, "variable written");
    }

    if matches!(scope, VariableScope::Config | VariableScope::Persistent) {
        config.save()?;
    }
    Ok(())
}
