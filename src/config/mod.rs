//! Shell configuration
//!
//! `AppConfig` is the one mutable object evaluation touches besides the OS
//! environment. It is stored as TOML (`lumi.toml`) in the platform config
//! directory; the `persistent` variable store lives in the same file and is
//! saved after every write.

pub mod properties;
pub mod store;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use store::VariableStore;

pub const CONFIG_FILE_NAME: &str = "lumi.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not determine a configuration directory")]
    NoConfigDir,
}

/// Named colours, stored as strings. Applying them is up to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub foreground: String,
    pub background: String,
    pub error: String,
    pub warning: String,
    pub notice: String,
    pub prompt_user_name: String,
    pub prompt_directory: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            foreground: "#BFBFBF".to_string(),
            background: "#250440".to_string(),
            error: "#FF4383".to_string(),
            warning: "#F9B816".to_string(),
            notice: "#1D88F1".to_string(),
            prompt_user_name: "#50B1FF".to_string(),
            prompt_directory: "#F8B068".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Abbreviate the home directory as `~` in `pwd` and the prompt
    pub use_tilde: bool,
    /// Scope used by `$name` without an explicit `scope:` prefix
    pub default_variable_scope: Option<String>,
    /// Built-ins that fall through to external programs (ASCII case-insensitive)
    pub disabled_commands: Vec<String>,
    pub disable_all_commands: bool,
    pub color_scheme: ColorScheme,
    pub persistent: VariableStore,
    #[serde(skip)]
    pub temporary: VariableStore,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_tilde: true,
            default_variable_scope: None,
            disabled_commands: Vec::new(),
            disable_all_commands: false,
            color_scheme: ColorScheme::default(),
            persistent: VariableStore::new(),
            temporary: VariableStore::new(),
            path: None,
        }
    }
}

impl AppConfig {
    /// `lumi.toml` inside the platform config directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "lumi").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "config file missing, writing defaults");
            let config = Self::default().with_path(path);
            config.save()?;
            return Ok(config);
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), persistent = config.persistent.len(), "loaded config");
        Ok(config.with_path(path))
    }

    /// Attach a backing file. Without one, `save` does nothing.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            debug!("config has no backing file, skipping save");
            return Ok(());
        };

        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Restore every saved setting to its default and save. Temporary
    /// variables are kept.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        let temporary = std::mem::take(&mut self.temporary);
        let path = self.path.take();
        *self = Self {
            temporary,
            path,
            ..Self::default()
        };
        self.save()
    }

    pub fn is_command_disabled(&self, name: &str) -> bool {
        self.disable_all_commands
            || self
                .disabled_commands
                .iter()
                .any(|disabled| disabled.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.use_tilde);
        assert!(config.default_variable_scope.is_none());
        assert!(config.path().is_none());
        assert!(config.save().is_ok());
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = AppConfig::load(&path).unwrap();
        assert!(path.exists());
        assert!(config.use_tilde);
        assert_eq!(config.path(), Some(path.as_path()));
    }

    #[test]
    fn test_persistent_survives_reload_but_temporary_does_not() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = AppConfig::load(&path).unwrap();
        config.persistent.set("Answer", "42");
        config.temporary.set("scratch", "x");
        config.use_tilde = false;
        config.save().unwrap();

        let reloaded = AppConfig::load(&path).unwrap();
        assert_eq!(reloaded.persistent.get("answer"), Some("42"));
        assert!(reloaded.temporary.is_empty());
        assert!(!reloaded.use_tilde);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "use_tilde = [").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "disabled_commands = [\"Echo\"]\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!(config.use_tilde);
        assert!(config.is_command_disabled("echo"));
        assert!(!config.is_command_disabled("cd"));
    }

    #[test]
    fn test_reset_keeps_temporary_and_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = AppConfig::load(&path).unwrap();
        config.persistent.set("a", "1");
        config.temporary.set("__NO_EXECUTE", "false");
        config.disable_all_commands = true;
        config.reset().unwrap();

        assert!(config.persistent.is_empty());
        assert!(!config.disable_all_commands);
        assert_eq!(config.temporary.get("__no_execute"), Some("false"));
        assert_eq!(config.path(), Some(path.as_path()));
    }
}
