//! hkdeploy - Entry Point
//!
//! CLI for deploying, scaling, and maintaining a Heroku-hosted app.
//! Every subcommand maps 1:1 to a core operation and exits non-zero on
//! failure.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use secrecy::SecretString;
use tracing::error;

use hkdeploy::deploy::Deployer;
use hkdeploy::errors::HelperError;
use hkdeploy::logs::{init_logging, LogLevel};
use hkdeploy::models::deployment::{AppIdentity, DeployRequest};
use hkdeploy::models::formation::ScaleTargets;

#[derive(Parser)]
#[command(name = "hkdeploy", version, about = "Heroku deployment helper")]
struct Cli {
    /// Name of the Heroku app
    #[arg(long, env = "HEROKU_APP")]
    app: String,

    /// Platform API key
    #[arg(long, env = "HEROKU_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy a branch: push, migrate, and rescale
    Deploy {
        /// Local git ref to push
        #[arg(long)]
        branch: String,

        /// Worker quantity to scale to after the deploy
        #[arg(long)]
        worker: Option<u32>,

        /// Clock quantity to scale to after the deploy
        #[arg(long)]
        clock: Option<u32>,

        /// Put the app into maintenance mode around the deploy
        #[arg(long)]
        maintenance: bool,
    },

    /// Scale the worker and clock formations
    Scale {
        /// Worker quantity
        #[arg(long)]
        worker: Option<u32>,

        /// Clock quantity
        #[arg(long)]
        clock: Option<u32>,
    },

    /// Enable or disable maintenance mode
    Maintenance {
        #[arg(value_enum)]
        state: MaintenanceState,
    },

    /// Restart all dynos
    Restart,

    /// Show the version label of the latest build
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MaintenanceState {
    On,
    Off,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let identity = AppIdentity::new(SecretString::from(cli.api_key), cli.app);
    let deployer = match Deployer::connect(identity) {
        Ok(deployer) => deployer,
        Err(e) => {
            error!("Failed to create the platform client: {}", e);
            std::process::exit(1);
        }
    };

    let result: Result<(), HelperError> = match cli.command {
        Command::Deploy {
            branch,
            worker,
            clock,
            maintenance,
        } => {
            let outcome = deployer
                .deploy(DeployRequest {
                    branch,
                    worker,
                    clock,
                    enable_maintenance: maintenance,
                })
                .await;

            if outcome.success {
                println!("{}", outcome.message.as_str().green());
                return;
            }
            eprintln!("{}", outcome.message.as_str().red());
            std::process::exit(1);
        }
        Command::Scale { worker, clock } => deployer.scale(ScaleTargets { worker, clock }).await,
        Command::Maintenance { state } => {
            deployer
                .maintenance(matches!(state, MaintenanceState::On))
                .await
        }
        Command::Restart => deployer.restart().await,
        Command::Version => match deployer.version().await {
            Ok(version) => {
                println!("{}", version);
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("{}", format!("{}", e).as_str().red());
        std::process::exit(1);
    }
}
