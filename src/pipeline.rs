//! The full run-to-completion pipeline: locate the latest release, fetch the
//! artifact, build the image, supersede any prior instance, launch, verify.
//!
//! Steps run strictly in sequence; each depends on the previous step's
//! output. Verification is the only best-effort phase — its failures are
//! reported as warnings and never change the overall outcome.

use std::path::Path;

use crate::config::ServerProperties;
use crate::docker::{self, ServerSpec};
use crate::download;
use crate::error::Result;
use crate::release::{self, AssetFilter};
use crate::status;

pub const RELEASE_INDEX_URL: &str =
    "https://api.github.com/repos/robocode-dev/tank-royale/releases/latest";

/// The server ships inside the GUI jar.
pub const ASSET_FILTER: AssetFilter<'static> = AssetFilter {
    prefix: "robocode-tankroyale-gui-",
    suffix: ".jar",
};

/// Runs the whole pipeline from `work_dir` (the directory holding the Docker
/// build context). Any unrecovered failure propagates to the caller, which
/// must terminate with a non-zero exit code.
pub async fn run(work_dir: &Path, spec: &ServerSpec) -> Result<()> {
    let client = reqwest::Client::new();

    let (url, asset_name) = release::locate_latest(&client, RELEASE_INDEX_URL, ASSET_FILTER).await?;

    // Stored under a fixed name so the Dockerfile and the presence check do
    // not depend on the release version.
    let dest = work_dir.join(&spec.artifact_name);
    download::fetch(&client, &url, &dest, &asset_name).await?;

    docker::build_image(spec, work_dir).await?;
    docker::supersede(spec, work_dir).await?;
    docker::launch(spec, work_dir).await?;
    docker::verify(spec, work_dir, &client).await?;

    show_connection_info(spec);
    show_log_hints(spec);

    status::success("Tank Royale server is now running!");
    Ok(())
}

/// Prints the server URL and connection secrets from `server.properties`,
/// when present. The file is written by the server, so on a first launch it
/// may not exist yet.
fn show_connection_info(spec: &ServerSpec) {
    status::step("Connection information");

    let path = Path::new("server.properties");
    match ServerProperties::load(path) {
        Some(props) => {
            let port = props.local_port.unwrap_or(spec.port);
            status::info(&format!("Server URL: ws://localhost:{port}"));
            if let Some(secret) = &props.bots_secret {
                status::info(&format!("Bot secret: {secret} (for bot connections)"));
            }
            if let Some(secret) = &props.controller_secret {
                status::info(&format!(
                    "Controller secret: {secret} (for UI/observer connections)"
                ));
            }
            status::info(&format!("Config file: {}", path.display()));
        }
        None => {
            status::warning("server.properties not found - secrets may be generated at runtime");
            status::info(&format!("Server URL: ws://localhost:{}", spec.port));
        }
    }
}

/// Prints the log commands available once the container is up.
fn show_log_hints(spec: &ServerSpec) {
    let name = &spec.container_name;
    status::step("Logging options");
    status::info(&format!("View current logs:      docker logs {name}"));
    status::info(&format!("Follow in real time:    docker logs -f {name}"));
    status::info("Or through this tool:   tankroyale-runner logs [--source server|startup] [--tail N] [--follow]");
}
