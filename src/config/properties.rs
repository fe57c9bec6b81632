//! Config property registry
//!
//! The `config` variable scope reads and writes settings by dotted path
//! (`UseTilde`, `ColorScheme.Foreground`, ...). Only the paths listed here
//! are visible; the variable stores themselves are not.

use lazy_static::lazy_static;

use crate::config::AppConfig;
use crate::interpreter::errors::EvalError;
use crate::interpreter::variables::VariableScope;

pub type Getter = fn(&AppConfig) -> String;
pub type Setter = fn(&mut AppConfig, &str) -> Result<(), EvalError>;

/// One externally visible setting.
pub struct ConfigProperty {
    pub path: &'static str,
    pub get: Getter,
    pub set: Setter,
}

fn parse_bool(path: &str, value: &str) -> Result<bool, EvalError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(EvalError::InvalidConfigValue {
            name: path.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

macro_rules! color_property {
    ($path:literal, $field:ident) => {
        ConfigProperty {
            path: $path,
            get: |config: &AppConfig| config.color_scheme.$field.clone(),
            set: |config: &mut AppConfig, value: &str| {
                config.color_scheme.$field = value.to_string();
                Ok(())
            },
        }
    };
}

lazy_static! {
    static ref PROPERTIES: Vec<ConfigProperty> = vec![
        ConfigProperty {
            path: "UseTilde",
            get: |config: &AppConfig| config.use_tilde.to_string(),
            set: |config: &mut AppConfig, value: &str| {
                config.use_tilde = parse_bool("UseTilde", value)?;
                Ok(())
            },
        },
        ConfigProperty {
            path: "DefaultVariableScope",
            get: |config: &AppConfig| config.default_variable_scope.clone().unwrap_or_default(),
            set: |config: &mut AppConfig, value: &str| {
                let value = value.trim();
                if value.is_empty() {
                    config.default_variable_scope = None;
                    return Ok(());
                }
                if VariableScope::from_name(value).is_none() {
                    return Err(EvalError::InvalidConfigValue {
                        name: "DefaultVariableScope".to_string(),
                        value: value.to_string(),
                        expected: "a variable scope name",
                    });
                }
                config.default_variable_scope = Some(value.to_string());
                Ok(())
            },
        },
        ConfigProperty {
            path: "DisableAllCommands",
            get: |config: &AppConfig| config.disable_all_commands.to_string(),
            set: |config: &mut AppConfig, value: &str| {
                config.disable_all_commands = parse_bool("DisableAllCommands", value)?;
                Ok(())
            },
        },
        ConfigProperty {
            path: "DisabledCommands",
            get: |config: &AppConfig| config.disabled_commands.join(","),
            set: |config: &mut AppConfig, value: &str| {
                config.disabled_commands = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                Ok(())
            },
        },
        color_property!("ColorScheme.Foreground", foreground),
        color_property!("ColorScheme.Background", background),
        color_property!("ColorScheme.Error", error),
        color_property!("ColorScheme.Warning", warning),
        color_property!("ColorScheme.Notice", notice),
        color_property!("ColorScheme.PromptUserName", prompt_user_name),
        color_property!("ColorScheme.PromptDirectory", prompt_directory),
    ];
}

/// Look up a property, ignoring ASCII case.
pub fn find(path: &str) -> Option<&'static ConfigProperty> {
    PROPERTIES
        .iter()
        .find(|property| property.path.eq_ignore_ascii_case(path))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PROPERTIES.iter().map(|property| property.path)
}
