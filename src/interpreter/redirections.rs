//! Redirection Handling
//!
//! Handles redirection devices:
//! - < : Read a device's lines as input
//! - > : Write stdout to a device
//! - >> : Write stderr to a device
//! - >>> : Write stdout then stderr to a device
//!
//! Legacy DOS device names (`CON`, `PRN`, `AUX`, `NUL`, `COM1`-`COM9`,
//! `LPT1`-`LPT9`) are recognised on every platform. Only `NUL` is usable;
//! it reads as empty and discards writes.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::ast::types::RedirectionMode;
use crate::interpreter::errors::EvalError;
use crate::interpreter::result::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Device<'a> {
    Null,
    /// A reserved name other than `NUL`
    Reserved,
    File(&'a Path),
}

fn is_reserved_name(stem: &str) -> bool {
    let upper = stem.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            let numbered = upper.strip_prefix("COM").or_else(|| upper.strip_prefix("LPT"));
            matches!(numbered.map(str::as_bytes), Some([b'1'..=b'9']))
        }
    }
}

/// Classify a device by the stem of its last path component, ignoring case.
pub fn classify_device(device: &str) -> Device<'_> {
    let path = Path::new(device);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    if !is_reserved_name(stem) {
        return Device::File(path);
    }
    if stem.eq_ignore_ascii_case("NUL") {
        Device::Null
    } else {
        Device::Reserved
    }
}

/// Read a device as lines.
pub async fn read_device(device: &str) -> Result<Vec<String>, EvalError> {
    match classify_device(device) {
        Device::Null => Ok(Vec::new()),
        Device::Reserved => Err(EvalError::DeviceUnsupported(device.to_string())),
        Device::File(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| match source.kind() {
                    ErrorKind::NotFound => EvalError::DeviceNotFound(device.to_string()),
                    _ => EvalError::io(path, source),
                })?;
            debug!(device, bytes = text.len(), "read redirection input");
            Ok(text.lines().map(str::to_string).collect())
        }
    }
}

/// Create or truncate a device and write `lines` to it.
pub async fn write_device(device: &str, lines: &[String]) -> Result<(), EvalError> {
    match classify_device(device) {
        Device::Null => Ok(()),
        Device::Reserved => Err(EvalError::DeviceUnsupported(device.to_string())),
        Device::File(path) => {
            let mut text = String::new();
            for line in lines {
                text.push_str(line);
                text.push('\n');
            }
            tokio::fs::write(path, text)
                .await
                .map_err(|source| EvalError::io(path, source))?;
            debug!(device, lines = lines.len(), "wrote redirection output");
            Ok(())
        }
    }
}

/// The lines an output redirection writes for a value.
pub fn select_lines(value: &Value, mode: RedirectionMode) -> Vec<String> {
    match (mode, value) {
        (RedirectionMode::StdErr, Value::Streams(streams)) => streams.stderr.clone(),
        (RedirectionMode::StdErr, _) => Vec::new(),
        (RedirectionMode::StdOutAndErr, Value::Streams(streams)) => {
            let mut lines = streams.stdout.clone();
            lines.extend(streams.stderr.iter().cloned());
            lines
        }
        _ => value.lines(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::result::StandardStreams;
    use tempfile::TempDir;

    #[test]
    fn test_classify_reserved_names() {
        assert_eq!(classify_device("NUL"), Device::Null);
        assert_eq!(classify_device("nul"), Device::Null);
        assert_eq!(classify_device("nul.txt"), Device::Null);
        assert_eq!(classify_device("dir/NUL"), Device::Null);
        assert_eq!(classify_device("CON"), Device::Reserved);
        assert_eq!(classify_device("com1"), Device::Reserved);
        assert_eq!(classify_device("LPT9.log"), Device::Reserved);
        assert_eq!(classify_device("COM0"), Device::File(Path::new("COM0")));
        assert_eq!(classify_device("COM10"), Device::File(Path::new("COM10")));
        assert_eq!(classify_device("console"), Device::File(Path::new("console")));
    }

    #[tokio::test]
    async fn test_null_device() {
        assert!(read_device("NUL").await.unwrap().is_empty());
        write_device("NUL", &["discarded".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_reserved_device_is_unsupported() {
        let err = read_device("PRN").await.unwrap_err();
        assert!(matches!(err, EvalError::DeviceUnsupported(ref d) if d == "PRN"));
        let err = write_device("aux", &[]).await.unwrap_err();
        assert!(matches!(err, EvalError::DeviceUnsupported(_)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");
        let err = read_device(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, EvalError::DeviceNotFound(_)));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let device = path.to_str().unwrap();

        write_device(device, &["a".to_string(), "b".to_string()]).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
        assert_eq!(read_device(device).await.unwrap(), vec!["a", "b"]);

        write_device(device, &["c".to_string()]).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "c\n");
    }

    #[test]
    fn test_select_lines() {
        let streams = Value::Streams(StandardStreams::new(
            vec!["out".to_string()],
            vec!["err".to_string()],
        ));
        assert_eq!(select_lines(&streams, RedirectionMode::StdOut), vec!["out"]);
        assert_eq!(select_lines(&streams, RedirectionMode::StdErr), vec!["err"]);
        assert_eq!(
            select_lines(&streams, RedirectionMode::StdOutAndErr),
            vec!["out", "err"]
        );
        assert_eq!(
            select_lines(&Value::scalar("x"), RedirectionMode::StdOutAndErr),
            vec!["x"]
        );
        assert!(select_lines(&Value::scalar("x"), RedirectionMode::StdErr).is_empty());
    }
}
