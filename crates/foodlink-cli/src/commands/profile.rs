//! Profile commands

use anyhow::{anyhow, Result};
use clap::Subcommand;
use foodlink_core::{UpdateProfileRequest, UserProfile};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{or_dash, print_single, print_success};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show your profile
    Show,

    /// Update your profile
    Update {
        /// Full name
        #[arg(long)]
        full_name: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Postal address
        #[arg(long)]
        address: Option<String>,

        /// Avatar image URL
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

/// Profile row for table display
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow {
    #[tabled(rename = "Name")]
    pub full_name: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Phone")]
    pub phone: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Avatar")]
    pub avatar_url: String,
}

impl From<&UserProfile> for ProfileRow {
    fn from(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: or_dash(profile.phone.as_deref()),
            address: or_dash(profile.address.as_deref()),
            avatar_url: or_dash(profile.avatar_url.as_deref()),
        }
    }
}

pub async fn execute(ctx: &Context, action: ProfileAction) -> Result<()> {
    ctx.require_login()?;

    match action {
        ProfileAction::Show => show_profile(ctx).await,
        ProfileAction::Update {
            full_name,
            phone,
            address,
            avatar_url,
        } => {
            let request = UpdateProfileRequest {
                full_name,
                phone,
                address,
                avatar_url,
            };
            update_profile(ctx, &request).await
        }
    }
}

async fn show_profile(ctx: &Context) -> Result<()> {
    let profile = ctx
        .session
        .refresh_profile()
        .await
        .ok_or_else(|| anyhow!("Could not load profile. Check that the server is reachable."))?;

    print_single(&ProfileRow::from(&profile), ctx.format)
}

async fn update_profile(ctx: &Context, request: &UpdateProfileRequest) -> Result<()> {
    if request.full_name.trim().is_empty() {
        return Err(anyhow!("Full name cannot be empty"));
    }

    let profile = ctx.session.update_profile(request).await?;

    print_success("Profile updated", ctx.quiet);
    print_single(&ProfileRow::from(&profile), ctx.format)
}
