//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod auth;
pub mod config;
pub mod family;
pub mod profile;

use anyhow::{bail, Result};
use foodlink_core::{ApiClient, ClientConfig, FileTokenStore, SessionManager};

use crate::output::OutputFormat;

pub type Session = SessionManager<ApiClient, FileTokenStore>;

/// Shared context for all commands
pub struct Context {
    pub session: Session,
    pub config: ClientConfig,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Fail early with a hint when no session is active
    pub fn require_login(&self) -> Result<()> {
        if !self.session.state().is_authenticated() {
            bail!("Not signed in. Run `foodlink auth login` first.");
        }
        Ok(())
    }

    pub fn client(&self) -> &ApiClient {
        self.session.backend()
    }
}
