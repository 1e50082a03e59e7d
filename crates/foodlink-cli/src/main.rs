//! FoodLink CLI - terminal front end for the FoodLink backend
//!
//! Signs in and out, shows and edits the profile, and manages family
//! member records. The session survives between invocations through the
//! token file.

mod commands;
mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use foodlink_core::config::{ENV_API_URL, ENV_TOKEN_PATH};
use foodlink_core::{ApiClient, ClientConfig, FileTokenStore, SessionManager};

#[derive(Parser)]
#[command(name = "foodlink")]
#[command(author, version, about = "FoodLink account and family records CLI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Override the backend URL (or set FOODLINK_API_URL env var)
    #[arg(long, env = "FOODLINK_API_URL", global = true)]
    api_url: Option<String>,

    /// Override the token file path (or set FOODLINK_TOKEN_PATH env var)
    #[arg(long, env = "FOODLINK_TOKEN_PATH", global = true)]
    token_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign out and inspect the session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },

    /// View and edit your profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },

    /// Manage family members and their health conditions
    Family {
        #[command(subcommand)]
        action: commands::family::FamilyAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Flags win over the environment; export them so every lookup agrees
    if let Some(url) = &cli.api_url {
        std::env::set_var(ENV_API_URL, url);
    }
    if let Some(path) = &cli.token_path {
        std::env::set_var(ENV_TOKEN_PATH, path);
    }

    let config = ClientConfig::from_env()?;

    match cli.command {
        // Config is readable without touching the network
        Commands::Config { action } => commands::config::execute(&config, cli.format, action).await,
        Commands::Auth { action } => {
            let ctx = connect(config, cli.format, cli.quiet).await?;
            commands::auth::execute(&ctx, action).await
        }
        Commands::Profile { action } => {
            let ctx = connect(config, cli.format, cli.quiet).await?;
            commands::profile::execute(&ctx, action).await
        }
        Commands::Family { action } => {
            let ctx = connect(config, cli.format, cli.quiet).await?;
            commands::family::execute(&ctx, action).await
        }
    }
}

/// Restore the session from the token file and build the command context
async fn connect(
    config: ClientConfig,
    format: output::OutputFormat,
    quiet: bool,
) -> Result<commands::Context> {
    let client = Arc::new(ApiClient::from_config(&config)?);
    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let session = SessionManager::start(client, store, config.restore).await;

    Ok(commands::Context {
        session,
        config,
        format,
        quiet,
    })
}
