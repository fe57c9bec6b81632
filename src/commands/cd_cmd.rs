// src/commands/cd_cmd.rs
use std::env;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::interpreter::errors::EvalError;
use crate::interpreter::helpers::tilde::{expand_tilde, home_dir};
use crate::interpreter::result::ShellResult;

/// Changes the process working directory. With no argument, goes home.
pub struct CdCommand;

fn failure(message: String) -> CommandResult {
    Ok(ShellResult::with_exit_code(-1, Vec::new(), vec![message]))
}

#[async_trait]
impl Command for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    async fn execute(&self, ctx: CommandContext<'_>) -> CommandResult {
        let home = home_dir();
        let requested = ctx.args.first().map(String::as_str).unwrap_or_default();

        let target: PathBuf = match (requested, &home) {
            ("", Some(home)) => home.clone(),
            ("", None) => return failure("cd: home directory could not be determined".to_string()),
            (path, Some(home)) => expand_tilde(home, path),
            (path, None) => PathBuf::from(path),
        };

        if target.is_file() {
            return failure(format!("cd: '{}' is a file, not a directory", requested));
        }
        if !target.is_dir() {
            return failure(format!("cd: directory '{}' could not be found", requested));
        }

        env::set_current_dir(&target).map_err(|source| EvalError::io(&target, source))?;
        Ok(ShellResult::absent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CWD_LOCK;
    use crate::config::AppConfig;
    use crate::interpreter::result::Value;
    use tempfile::TempDir;

    async fn run(args: &[&str]) -> ShellResult {
        let mut config = AppConfig::default();
        let ctx = CommandContext::new(
            args.iter().map(|s| s.to_string()).collect(),
            Value::Absent,
            &mut config,
        );
        CdCommand.execute(ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_cd_into_directory() {
        let _guard = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = env::current_dir().unwrap();
        let dir = TempDir::new().unwrap();

        let result = run(&[dir.path().to_str().unwrap()]).await;
        assert!(result.is_success());
        assert_eq!(
            env::current_dir().unwrap().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );

        env::set_current_dir(original).unwrap();
    }

    #[tokio::test]
    async fn test_cd_missing_directory() {
        let _guard = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let result = run(&[missing.to_str().unwrap()]).await;
        assert_eq!(result.exit_code, -1);
        assert_eq!(
            result.value,
            Value::Streams(crate::interpreter::result::StandardStreams::new(
                vec![],
                vec![format!("cd: directory '{}' could not be found", missing.display())]
            ))
        );
    }

    #[tokio::test]
    async fn test_cd_into_file() {
        let _guard = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let result = run(&[file.to_str().unwrap()]).await;
        assert!(!result.is_success());
    }
}
