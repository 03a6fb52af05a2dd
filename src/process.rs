use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Result, RunnerError};
use crate::status;

/// Outcome of one external command invocation. The exit code is the only
/// success signal callers consume.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an external command synchronously, capturing stdout and stderr.
///
/// The invocation is echoed before execution. With `strict` set, a non-zero
/// exit becomes `ExecutionFailed`; probes pass `strict = false` and inspect
/// the returned `ProcessResult` themselves.
pub async fn run<S: AsRef<str>>(
    program: &str,
    args: &[S],
    cwd: Option<&Path>,
    strict: bool,
) -> Result<ProcessResult> {
    let rendered: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
    status::info(&format!("Executing: {} {}", program, rendered.join(" ")));

    let mut cmd = Command::new(program);
    cmd.args(&rendered);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RunnerError::ToolNotFound(program.to_string())
        } else {
            RunnerError::Io(e)
        }
    })?;

    let result = ProcessResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if strict && !result.success() {
        return Err(RunnerError::ExecutionFailed {
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        });
    }

    Ok(result)
}

/// Runs a command with the parent's stdio inherited, streaming its output
/// until it exits or the operator interrupts with Ctrl-C.
///
/// On interrupt the child is killed rather than left orphaned;
/// `kill_on_drop` backstops the case where this future is dropped early.
pub async fn stream<S: AsRef<str>>(program: &str, args: &[S]) -> Result<()> {
    let rendered: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
    status::info(&format!("Executing: {} {}", program, rendered.join(" ")));

    let mut cmd = Command::new(program);
    cmd.args(&rendered)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RunnerError::ToolNotFound(program.to_string())
        } else {
            RunnerError::Io(e)
        }
    })?;

    tokio::select! {
        exit = child.wait() => {
            let exit = exit?;
            if !exit.success() {
                return Err(RunnerError::ExecutionFailed {
                    code: exit.code().unwrap_or(-1),
                    stderr: String::new(),
                });
            }
        }
        _ = tokio::signal::ctrl_c() => {
            let _ = child.kill().await;
            status::info("Stopped following logs");
        }
    }

    Ok(())
}
