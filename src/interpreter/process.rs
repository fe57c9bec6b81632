//! External Processes
//!
//! Spawns a program with an argv vector. When output is captured, stdout and
//! stderr are drained concurrently so neither pipe can fill up and stall the
//! child; stdin, when given, is written in full and closed alongside them.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, trace};

use crate::interpreter::errors::EvalError;
use crate::interpreter::result::{ShellResult, StandardStreams, Value};

/// Run `program` with `args`. `input` (if present) becomes its stdin, one
/// line per entry.
pub async fn run_process(
    program: &str,
    args: &[String],
    input: Option<Vec<String>>,
    capture: bool,
) -> Result<ShellResult, EvalError> {
    let mut command = Command::new(program);
    command.args(args);
    command.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    if capture {
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
    }

    debug!(program, ?args, capture, "spawning process");
    let mut child = command.spawn().map_err(|source| EvalError::ProgramNotFound {
        name: program.to_string(),
        source,
    })?;

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let ((), stdout, stderr) = tokio::join!(
        write_input(stdin, input.unwrap_or_default()),
        read_lines(stdout),
        read_lines(stderr),
    );
    let stdout = stdout.map_err(|source| EvalError::io(program, source))?;
    let stderr = stderr.map_err(|source| EvalError::io(program, source))?;

    let status = child
        .wait()
        .await
        .map_err(|source| EvalError::io(program, source))?;
    let exit_code = exit_code(status);
    trace!(program, exit_code, "process exited");

    if !capture {
        return Ok(ShellResult::new(exit_code, Value::Absent));
    }

    let value = if stderr.is_empty() && stdout.len() == 1 {
        Value::Scalar(stdout.into_iter().next().unwrap_or_default())
    } else {
        Value::Streams(StandardStreams::new(stdout, stderr))
    };
    Ok(ShellResult::new(exit_code, value))
}

/// Signal-terminated children have no code; report -1.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

async fn write_input(stdin: Option<ChildStdin>, lines: Vec<String>) {
    let Some(mut stdin) = stdin else {
        return;
    };

    let mut data = String::new();
    for line in lines {
        data.push_str(&line);
        data.push('\n');
    }

    // A child that exits without reading its input closes the pipe early
    if let Err(err) = stdin.write_all(data.as_bytes()).await {
        trace!(error = %err, "stdin closed before all input was written");
    }
    drop(stdin);
}

async fn read_lines<R>(reader: Option<R>) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(Vec::new());
    };

    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(lines)
}
