use anyhow::Context;
use clap::{Parser, Subcommand};

use tankroyale_runner::docker::ServerSpec;
use tankroyale_runner::logs::{self, LogSource};
use tankroyale_runner::{pipeline, status, util};

#[derive(Parser)]
#[command(
    name = "tankroyale-runner",
    about = "Downloads the latest Tank Royale server release and runs it in Docker"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Fetch the latest server release, build the image, and (re)start the container
    Up {
        /// Directory holding the Docker build context (defaults to the current directory)
        #[arg(long)]
        dir: Option<String>,
    },
    /// View server logs
    Logs {
        /// Log source to read
        #[arg(long, value_enum, default_value = "container")]
        source: LogSource,
        /// Number of lines to show
        #[arg(long, default_value_t = logs::DEFAULT_TAIL)]
        tail: u32,
        /// Follow in real time until interrupted
        #[arg(short, long)]
        follow: bool,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let spec = ServerSpec::default();
    let work_dir = std::env::current_dir().context("cannot determine current directory")?;

    match cli.command {
        CliCommand::Up { dir } => {
            let work_dir = match dir {
                Some(dir) => util::expand_tilde(&dir),
                None => work_dir,
            };
            pipeline::run(&work_dir, &spec).await?;
        }
        CliCommand::Logs {
            source,
            tail,
            follow,
        } => {
            logs::show(&spec.container_name, source, tail, follow, &work_dir).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        status::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
