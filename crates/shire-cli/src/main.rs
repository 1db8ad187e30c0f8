//! Shire CLI
//!
//! Runs the blocker agent against the daemon's bridge socket, and offers
//! offline tools for checking URLs against a saved policy.

mod config;
mod documents;
mod inspect;
mod unix;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use config::Config;
use documents::FileHost;
use shire_agent::{Agent, HostRequest, SweepConfig, TabSweeper};
use shire_core::{PolicyStore, VerdictEngine};
use unix::UnixConnector;

#[derive(Parser)]
#[command(name = "shire")]
#[command(about = "Shire blocker agent and policy tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the daemon and enforce its policy
    Run {
        /// Config file (default: ~/.config/shire/agent.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bridge socket, overriding the config file
        #[arg(short, long)]
        socket: Option<PathBuf>,

        /// JSON file listing open documents: [{"id":1,"url":"..."}]
        #[arg(short, long)]
        documents: Option<PathBuf>,

        /// Log filter, overriding the config file
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Check URLs against a saved policy
    Check {
        /// state_update frame or state object
        #[arg(short, long)]
        policy: PathBuf,

        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Show the blocks and derived pattern sets of a saved policy
    Inspect {
        /// state_update frame or state object
        #[arg(short, long)]
        policy: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            socket,
            documents,
            log_level,
        } => cmd_run(config.as_deref(), socket, documents, log_level),
        Commands::Check { policy, urls } => cmd_check(&policy, urls),
        Commands::Inspect { policy } => cmd_inspect(&policy),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn setup_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(
    config_path: Option<&Path>,
    socket: Option<PathBuf>,
    documents: Option<PathBuf>,
    log_level: Option<String>,
) -> Result<(), String> {
    let mut config = Config::load(config_path)?;
    if let Some(socket) = socket {
        config.bridge.socket_path = socket;
    }
    if let Some(level) = log_level {
        config.logging.level = level;
    }

    setup_logging(&config.logging.level);
    log::info!("Using bridge socket {}", config.bridge.socket_path.display());

    let connector = UnixConnector::new(config.bridge.socket_path.clone(), config.bridge.max_frame_len);
    let host = FileHost::stdout(documents);
    let agent = Agent::new(connector, host, Arc::new(PolicyStore::new()), config.agent());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;

    runtime.block_on(agent.run_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }));

    Ok(())
}

fn cmd_check(policy_path: &Path, urls: Vec<String>) -> Result<(), String> {
    let store = Arc::new(PolicyStore::new());
    store.apply(inspect::load_policy(policy_path)?);

    let sweeper = TabSweeper::new(FileHost::stdout(None), VerdictEngine::new(store), SweepConfig::default());
    for url in urls {
        let response = sweeper.handle_request(HostRequest::CheckBlocked { url });
        let line = serde_json::to_string(&response).map_err(|e| format!("Failed to encode response: {e}"))?;
        println!("{line}");
    }

    Ok(())
}

fn cmd_inspect(policy_path: &Path) -> Result<(), String> {
    let policy = inspect::load_policy(policy_path)?;
    print!("{}", inspect::render(&policy));
    Ok(())
}
