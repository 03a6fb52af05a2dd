use std::path::Path;
use std::time::Duration;

use crate::error::{Result, RunnerError};
use crate::process;
use crate::status;

/// Identity and wiring of the managed server container.
///
/// Threaded explicitly through every lifecycle call; the one-instance-per-name
/// guarantee comes from `supersede`, not from global state.
#[derive(Debug, Clone)]
pub struct ServerSpec {
    pub image_name: String,
    pub container_name: String,
    pub port: u16,
    /// Image build context, relative to the working directory.
    pub build_dir: String,
    /// Filename the downloaded artifact is stored under.
    pub artifact_name: String,
}

impl Default for ServerSpec {
    fn default() -> Self {
        Self {
            image_name: "tank-royale-server".into(),
            container_name: "tank-royale-server".into(),
            // Not the upstream default 7654, to avoid clashing with a locally
            // running GUI.
            port: 7655,
            build_dir: "docker".into(),
            artifact_name: "robocode-tankroyale-gui.jar".into(),
        }
    }
}

/// Reported health of a container, read from its attached health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Other(String),
}

/// Classifies `docker inspect --format={{.State.Health.Status}}` output.
/// Returns `None` when the image has no health check attached.
pub fn classify_health(raw: &str) -> Option<HealthStatus> {
    match raw.trim() {
        "" => None,
        "healthy" => Some(HealthStatus::Healthy),
        "unhealthy" => Some(HealthStatus::Unhealthy),
        other => Some(HealthStatus::Other(other.to_string())),
    }
}

/// Host address the container can use to reach services on the host machine.
/// Docker Desktop resolves `host.docker.internal`; on Linux the default
/// bridge gateway is used instead.
pub fn host_gateway_alias() -> &'static str {
    if cfg!(target_os = "linux") {
        "172.17.0.1"
    } else {
        "host.docker.internal"
    }
}

/// Argument vector for `docker run`, exposed as data so the exact invocation
/// is testable: detached, fixed name, port bound to loopback only, the
/// operator's directory mounted read-only as `/app/config`, a host-gateway
/// alias, and an auto-restart policy.
pub fn run_args(spec: &ServerSpec, config_dir: &Path) -> Vec<String> {
    vec![
        "run".into(),
        "-d".into(),
        "--name".into(),
        spec.container_name.clone(),
        "-p".into(),
        format!("127.0.0.1:{port}:{port}", port = spec.port),
        "-v".into(),
        format!("{}:/app/config:ro", config_dir.display()),
        "--add-host".into(),
        format!("{}:host-gateway", host_gateway_alias()),
        "--restart".into(),
        "unless-stopped".into(),
        spec.image_name.clone(),
    ]
}

/// Copies the fetched artifact into the build context and builds the image.
/// A missing artifact or a failing build is fatal; there is no retry.
pub async fn build_image(spec: &ServerSpec, work_dir: &Path) -> Result<()> {
    status::step(&format!("Building Docker image: {}...", spec.image_name));

    let context_dir = work_dir.join(&spec.build_dir);
    let artifact = work_dir.join(&spec.artifact_name);
    if !artifact.exists() {
        return Err(RunnerError::BuildFailed(format!(
            "artifact not found: {}",
            artifact.display()
        )));
    }

    tokio::fs::copy(&artifact, context_dir.join(&spec.artifact_name)).await?;
    status::info(&format!(
        "Copied artifact into build context: {}",
        context_dir.display()
    ));

    process::run(
        "docker",
        &["build", "-t", spec.image_name.as_str(), "."],
        Some(&context_dir),
        true,
    )
    .await
    .map_err(into_build_failed)?;

    status::success("Docker image built successfully.");
    Ok(())
}

/// Tears down any prior instance registered under the spec's container name,
/// running or exited, so that `launch` starts from a clean slate.
///
/// Two-phase and idempotent: stop is only attempted on a running instance,
/// remove on any matching instance regardless of state.
pub async fn supersede(spec: &ServerSpec, work_dir: &Path) -> Result<()> {
    let name = spec.container_name.as_str();
    let name_filter = format!("name={name}");

    let running = process::run(
        "docker",
        &["ps", "-q", "-f", name_filter.as_str()],
        Some(work_dir),
        true,
    )
    .await?;
    if !running.stdout.trim().is_empty() {
        status::warning(&format!(
            "Container '{name}' is already running. Stopping and removing it."
        ));
        process::run("docker", &["stop", name], Some(work_dir), true).await?;
        process::run("docker", &["rm", name], Some(work_dir), true).await?;
    }

    let any = process::run(
        "docker",
        &["ps", "-aq", "-f", name_filter.as_str()],
        Some(work_dir),
        true,
    )
    .await?;
    if !any.stdout.trim().is_empty() {
        status::warning(&format!("Removing exited container '{name}'."));
        process::run("docker", &["rm", name], Some(work_dir), true).await?;
    }

    Ok(())
}

/// Starts a new instance from the built image. Must run after `supersede`;
/// a start failure is fatal and carries the runtime's own error output.
pub async fn launch(spec: &ServerSpec, work_dir: &Path) -> Result<()> {
    status::step("Starting server container...");

    let config_dir = std::env::current_dir()?;
    let args = run_args(spec, &config_dir);
    process::run("docker", &args, Some(work_dir), true)
        .await
        .map_err(into_launch_failed)?;

    status::success(&format!(
        "Server container '{}' started successfully!",
        spec.container_name
    ));
    status::info(&format!("Server URL: ws://localhost:{}", spec.port));
    status::info(&format!(
        "Port forwarding: 127.0.0.1:{port} -> container:{port}",
        port = spec.port
    ));
    status::info(&format!("Config mounted from: {}", config_dir.display()));
    Ok(())
}

/// Post-launch verification: running check, health-check classification, and
/// an HTTP reachability probe.
///
/// Every outcome here is informational. Probe failures are reported as
/// warnings and never change the result of the launch itself.
pub async fn verify(spec: &ServerSpec, work_dir: &Path, client: &reqwest::Client) -> Result<()> {
    status::step("Waiting for server to initialize...");
    tokio::time::sleep(Duration::from_secs(3)).await;

    let name = spec.container_name.as_str();
    let name_filter = format!("name={name}");

    let running = process::run(
        "docker",
        &["ps", "-q", "-f", name_filter.as_str()],
        Some(work_dir),
        false,
    )
    .await?;
    if running.stdout.trim().is_empty() {
        status::error(&format!("Container '{name}' is not running!"));
        status::error("Recent container logs:");
        let logs = process::run(
            "docker",
            &["logs", "--tail", "20", name],
            Some(work_dir),
            false,
        )
        .await?;
        print!("{}", logs.stdout);
        eprint!("{}", logs.stderr);
        return Ok(());
    }
    status::success("Container is running");

    let inspect = process::run(
        "docker",
        &["inspect", "--format={{.State.Health.Status}}", name],
        Some(work_dir),
        false,
    )
    .await?;
    if inspect.success() {
        match classify_health(&inspect.stdout) {
            Some(HealthStatus::Healthy) => status::success("Container health check: HEALTHY"),
            Some(HealthStatus::Unhealthy) => status::warning("Container health check: UNHEALTHY"),
            Some(HealthStatus::Other(s)) => {
                status::info(&format!("Container health check: {}", s.to_uppercase()));
            }
            None => {}
        }
    }

    status::step("Testing server connectivity...");
    let probe = client
        .get(format!("http://localhost:{}/", spec.port))
        .timeout(Duration::from_secs(5))
        .send()
        .await;
    match probe {
        Ok(_) => status::success("Server is responding to HTTP requests"),
        Err(_) => {
            status::warning("Server not yet responding to HTTP requests (this may be normal)");
        }
    }

    Ok(())
}

fn into_build_failed(err: RunnerError) -> RunnerError {
    match err {
        RunnerError::ExecutionFailed { stderr, .. } => RunnerError::BuildFailed(stderr),
        other => other,
    }
}

fn into_launch_failed(err: RunnerError) -> RunnerError {
    match err {
        RunnerError::ExecutionFailed { stderr, .. } => RunnerError::LaunchFailed(stderr),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn run_args_wire_the_container_as_documented() {
        let spec = ServerSpec::default();
        let args = run_args(&spec, &PathBuf::from("/work/project"));
        let expected: Vec<String> = vec![
            "run".into(),
            "-d".into(),
            "--name".into(),
            "tank-royale-server".into(),
            "-p".into(),
            "127.0.0.1:7655:7655".into(),
            "-v".into(),
            "/work/project:/app/config:ro".into(),
            "--add-host".into(),
            format!("{}:host-gateway", host_gateway_alias()),
            "--restart".into(),
            "unless-stopped".into(),
            "tank-royale-server".into(),
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn port_binding_is_loopback_only() {
        let spec = ServerSpec {
            port: 9000,
            ..ServerSpec::default()
        };
        let args = run_args(&spec, &PathBuf::from("/tmp"));
        assert!(args.contains(&"127.0.0.1:9000:9000".to_string()));
    }

    #[test]
    fn config_volume_is_read_only() {
        let args = run_args(&ServerSpec::default(), &PathBuf::from("/tmp"));
        assert!(args.contains(&"/tmp:/app/config:ro".to_string()));
    }

    #[test]
    fn classifies_health_statuses() {
        assert_eq!(classify_health("healthy\n"), Some(HealthStatus::Healthy));
        assert_eq!(classify_health("unhealthy"), Some(HealthStatus::Unhealthy));
        assert_eq!(
            classify_health("starting"),
            Some(HealthStatus::Other("starting".into()))
        );
        assert_eq!(classify_health("  \n"), None);
    }

    #[tokio::test]
    async fn build_fails_fast_when_artifact_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_image(&ServerSpec::default(), dir.path())
            .await
            .unwrap_err();
        match err {
            RunnerError::BuildFailed(msg) => assert!(msg.contains("artifact not found")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
