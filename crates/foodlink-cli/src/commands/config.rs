//! Config commands
//!
//! Show the resolved client configuration and where each value came from.

use anyhow::Result;
use clap::Subcommand;
use foodlink_core::config::{ENV_API_URL, ENV_RESTORE, ENV_TIMEOUT_SECS, ENV_TOKEN_PATH};
use foodlink_core::{ClientConfig, FileTokenStore, TokenStore};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{mask_token, print_output, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
}

/// Config row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

pub async fn execute(config: &ClientConfig, format: OutputFormat, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(config, format).await,
    }
}

async fn show_config(config: &ClientConfig, format: OutputFormat) -> Result<()> {
    let rows = get_all_config(config).await;
    print_output(&rows, format)
}

async fn get_all_config(config: &ClientConfig) -> Vec<ConfigRow> {
    let mut rows = vec![
        ConfigRow {
            key: ENV_API_URL.to_string(),
            value: config.api_base_url.clone(),
            source: source_of(ENV_API_URL),
        },
        ConfigRow {
            key: ENV_TIMEOUT_SECS.to_string(),
            value: config.request_timeout_secs.to_string(),
            source: source_of(ENV_TIMEOUT_SECS),
        },
        ConfigRow {
            key: ENV_TOKEN_PATH.to_string(),
            value: config.token_path.to_string_lossy().to_string(),
            source: source_of(ENV_TOKEN_PATH),
        },
        ConfigRow {
            key: ENV_RESTORE.to_string(),
            value: config.restore.to_string(),
            source: source_of(ENV_RESTORE),
        },
    ];

    // Stored token, masked
    let store = FileTokenStore::new(config.token_path.clone());
    let (value, source) = match store.get_token().await {
        Ok(token) => (mask_token(token.as_deref()), "file".to_string()),
        Err(e) => (format!("unreadable: {}", e), "file".to_string()),
    };
    rows.push(ConfigRow {
        key: "token".to_string(),
        value,
        source,
    });

    rows
}

/// Where a value came from. Flags are exported to the environment at startup.
fn source_of(var: &str) -> String {
    if std::env::var(var).is_ok_and(|v| !v.trim().is_empty()) {
        "env".to_string()
    } else {
        "default".to_string()
    }
}
