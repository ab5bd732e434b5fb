use anyhow::Result;
use clap::{Parser, Subcommand};
use pistack::cli::{AppContext, install, lifecycle, setup};
use pistack::infra::config::default_config_dir;
use pistack::services::Action;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "pistack",
    version,
    about = "Provision self-hosted container services on a single host"
)]
struct Cli {
    /// Configuration directory (default: ~/.config/pistack)
    #[arg(long, env = "PISTACK_CONFIG_DIR", default_value_os_t = default_config_dir())]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate manifests if missing and bring services up
    Install {
        #[arg(required = true, value_name = "SERVICE")]
        services: Vec<String>,
    },
    /// Show every container the runtime knows about
    Status,
    /// Start existing containers
    Start {
        #[arg(required = true, value_name = "SERVICE")]
        services: Vec<String>,
    },
    /// Stop running containers
    Stop {
        #[arg(required = true, value_name = "SERVICE")]
        services: Vec<String>,
    },
    /// Restart containers
    Restart {
        #[arg(required = true, value_name = "SERVICE")]
        services: Vec<String>,
    },
    /// Remove containers (named volumes are kept)
    Remove {
        #[arg(required = true, value_name = "SERVICE")]
        services: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the last log lines of one container
    Logs {
        #[arg(required = true, value_name = "SERVICE")]
        services: Vec<String>,
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,
    },
    /// List installable services
    Catalog,
    /// Show URL and credentials of a service
    Info { service: String },
    /// Check runtime, tools and configuration
    Doctor,
    /// Write a default configuration file
    Init,
}

fn main() -> ExitCode {
    let layer = fmt::layer().compact().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(layer).with(filter).init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    if let Commands::Init = cli.command {
        return setup::init(&cli.config_dir);
    }

    let ctx = AppContext::new(&cli.config_dir)?;

    match cli.command {
        Commands::Install { services } => install::install(&ctx, &services),
        Commands::Status => lifecycle::status(&ctx),
        Commands::Start { services } => lifecycle::act(&ctx, Action::Start, &services),
        Commands::Stop { services } => lifecycle::act(&ctx, Action::Stop, &services),
        Commands::Restart { services } => lifecycle::act(&ctx, Action::Restart, &services),
        Commands::Remove { services, yes } => lifecycle::remove(&ctx, &services, yes),
        Commands::Logs { services, lines } => lifecycle::logs(&ctx, &services, lines),
        Commands::Catalog => setup::catalog(&ctx),
        Commands::Info { service } => setup::info(&ctx, &service),
        Commands::Doctor => setup::doctor(&ctx),
        Commands::Init => setup::init(&cli.config_dir),
    }
}
