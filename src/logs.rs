use std::path::Path;

use clap::ValueEnum;

use crate::error::{Result, RunnerError};
use crate::process;
use crate::status;

pub const DEFAULT_TAIL: u32 = 50;

/// Where to read log lines from: the runtime's captured stdout/stderr stream,
/// or a named file inside the running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogSource {
    /// Container stdout/stderr captured by Docker.
    Container,
    /// Server application log at /app/logs/server.log.
    Server,
    /// Container startup log at /app/logs/startup.log.
    Startup,
}

impl LogSource {
    /// In-instance file path, for sources read via `docker exec`.
    fn file_path(self) -> Option<&'static str> {
        match self {
            LogSource::Container => None,
            LogSource::Server => Some("/app/logs/server.log"),
            LogSource::Startup => Some("/app/logs/startup.log"),
        }
    }
}

/// Extracts the container id from `docker ps -q` output, if any.
fn running_id(ps_stdout: &str) -> Option<&str> {
    let id = ps_stdout.trim();
    (!id.is_empty()).then_some(id)
}

/// Argument vector for `docker logs` against the named container.
fn container_log_args(name: &str, tail: u32, follow: bool) -> Vec<String> {
    let mut args: Vec<String> = vec!["logs".into()];
    if follow {
        args.push("-f".into());
    }
    args.extend(["--tail".into(), tail.to_string(), name.into()]);
    args
}

/// Argument vector for tailing an in-instance file via `docker exec`.
fn exec_tail_args(name: &str, file: &str, tail: u32, follow: bool) -> Vec<String> {
    let mut args: Vec<String> = vec!["exec".into(), name.into(), "tail".into()];
    if follow {
        args.push("-f".into());
    }
    args.extend(["-n".into(), tail.to_string(), file.into()]);
    args
}

/// Fails with `InstanceNotRunning` unless the named container is currently
/// listed as running. Every facade operation goes through this guard before
/// touching the runtime.
async fn ensure_running(name: &str, work_dir: &Path) -> Result<()> {
    let name_filter = format!("name={name}");
    let result = process::run(
        "docker",
        &["ps", "-q", "-f", name_filter.as_str()],
        Some(work_dir),
        false,
    )
    .await?;

    if !result.success() || running_id(&result.stdout).is_none() {
        return Err(RunnerError::InstanceNotRunning(name.to_string()));
    }
    Ok(())
}

/// Shows logs from the requested source: the last `tail` lines, or an
/// unbounded follow until Ctrl-C.
pub async fn show(
    name: &str,
    source: LogSource,
    tail: u32,
    follow: bool,
    work_dir: &Path,
) -> Result<()> {
    ensure_running(name, work_dir).await?;

    let mode = if follow {
        "(following)".to_string()
    } else {
        format!("(last {tail} lines)")
    };
    match source {
        LogSource::Container => status::step(&format!("Container logs {mode}")),
        LogSource::Server => status::step(&format!("Server application logs {mode}")),
        LogSource::Startup => status::step(&format!("Container startup logs {mode}")),
    }

    let args = match source.file_path() {
        None => container_log_args(name, tail, follow),
        Some(file) => exec_tail_args(name, file, tail, follow),
    };

    if follow {
        status::info("Press Ctrl+C to stop following logs");
        return process::stream("docker", &args).await;
    }

    let result = process::run("docker", &args, Some(work_dir), false).await?;
    if result.success() {
        print!("{}", result.stdout);
    } else if source == LogSource::Container {
        status::error("Failed to retrieve logs");
        eprint!("{}", result.stderr);
    } else {
        // tail fails when the file has not been written yet
        status::warning("Log file may not exist yet");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_container_logs_invocation() {
        assert_eq!(
            container_log_args("tank-royale-server", 50, false),
            vec!["logs", "--tail", "50", "tank-royale-server"]
        );
    }

    #[test]
    fn follow_flag_precedes_tail() {
        assert_eq!(
            container_log_args("tank-royale-server", 20, true),
            vec!["logs", "-f", "--tail", "20", "tank-royale-server"]
        );
    }

    #[test]
    fn in_instance_tail_invocation() {
        assert_eq!(
            exec_tail_args("tank-royale-server", "/app/logs/server.log", 50, false),
            vec![
                "exec",
                "tank-royale-server",
                "tail",
                "-n",
                "50",
                "/app/logs/server.log"
            ]
        );
        assert_eq!(
            exec_tail_args("tank-royale-server", "/app/logs/startup.log", 10, true),
            vec![
                "exec",
                "tank-royale-server",
                "tail",
                "-f",
                "-n",
                "10",
                "/app/logs/startup.log"
            ]
        );
    }

    #[test]
    fn empty_ps_output_means_not_running() {
        assert_eq!(running_id(""), None);
        assert_eq!(running_id("  \n"), None);
        assert_eq!(running_id("a1b2c3d4\n"), Some("a1b2c3d4"));
    }

    #[test]
    fn sources_map_to_their_files() {
        assert_eq!(LogSource::Container.file_path(), None);
        assert_eq!(LogSource::Server.file_path(), Some("/app/logs/server.log"));
        assert_eq!(
            LogSource::Startup.file_path(),
            Some("/app/logs/startup.log")
        );
    }
}
