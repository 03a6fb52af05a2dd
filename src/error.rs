/// All errors that can occur while locating, fetching, or running the server.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Command not found: {0}. Is Docker installed and in your PATH?")]
    ToolNotFound(String),

    #[error("Command failed with exit code {code}: {stderr}")]
    ExecutionFailed { code: i32, stderr: String },

    #[error("No matching asset in release: {0}")]
    AssetNotFound(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Failed to build Docker image: {0}")]
    BuildFailed(String),

    #[error("Failed to start container: {0}")]
    LaunchFailed(String),

    #[error("Container '{0}' is not running")]
    InstanceNotRunning(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
