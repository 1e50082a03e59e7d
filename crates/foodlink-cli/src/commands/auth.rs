//! Auth commands
//!
//! Sign in, register, sign out and show the current session.

use anyhow::Result;
use clap::Subcommand;
use foodlink_core::User;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{or_dash, print_info, print_single, print_success, print_warning, OutputFormat};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in and remember the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (or set FOODLINK_PASSWORD env var)
        #[arg(long, env = "FOODLINK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account (does not sign in)
    Register {
        /// Full name
        #[arg(long)]
        name: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (or set FOODLINK_PASSWORD env var)
        #[arg(long, env = "FOODLINK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the current session
    Status,
}

/// Session row for table display
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "User")]
    pub user: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Role")]
    pub role: String,
    #[tabled(rename = "Admin")]
    pub is_admin: bool,
    #[tabled(rename = "Server")]
    pub server: String,
}

pub async fn execute(ctx: &Context, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login { email, password } => login(ctx, &email, &password).await,
        AuthAction::Register {
            name,
            email,
            password,
        } => register(ctx, &name, &email, &password).await,
        AuthAction::Logout => logout(ctx).await,
        AuthAction::Status => status(ctx).await,
    }
}

async fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let state = ctx.session.login(email, password).await?;

    let name = state
        .user()
        .and_then(|u| u.display_name())
        .unwrap_or(email)
        .to_string();
    print_success(&format!("Signed in as {}", name), ctx.quiet);
    Ok(())
}

async fn register(ctx: &Context, name: &str, email: &str, password: &str) -> Result<()> {
    ctx.session.register(name, email, password).await?;

    print_success(&format!("Account created for {}", email), ctx.quiet);
    print_info("Run `foodlink auth login` to sign in.", ctx.quiet);
    Ok(())
}

async fn logout(ctx: &Context) -> Result<()> {
    if !ctx.session.state().is_authenticated() {
        print_warning("Not signed in.", ctx.quiet);
    }

    ctx.session.logout().await;
    print_success("Signed out", ctx.quiet);
    Ok(())
}

async fn status(ctx: &Context) -> Result<()> {
    let state = ctx.session.state();

    // A trusted token carries no identity yet; ask the backend who it is
    let mut user: Option<User> = state.user().cloned();
    if state.is_authenticated() && user.is_none() {
        user = ctx
            .session
            .refresh_profile()
            .await
            .map(|profile| User::from(&profile));
    }

    let user = user.as_ref();
    let row = SessionRow {
        status: state.status().to_string(),
        user: or_dash(user.and_then(|u| u.display_name())),
        email: or_dash(user.and_then(|u| u.email.as_deref())),
        role: or_dash(user.and_then(|u| u.role.as_deref())),
        is_admin: user.is_some_and(|u| u.is_admin),
        server: ctx.config.api_base_url.clone(),
    };

    print_single(&row, ctx.format)?;
    if ctx.format == OutputFormat::Table && !state.is_authenticated() {
        print_info("Run `foodlink auth login` to sign in.", ctx.quiet);
    }
    Ok(())
}
