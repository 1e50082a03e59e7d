//! Backend seam for the session manager
//!
//! Abstracts the HTTP calls the session manager makes so it can be driven
//! by a mock in tests. [`ApiClient`] is the production implementation.

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{
    AuthPayload, LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserProfile,
};
use crate::services::{AuthService, UserService};

#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Install (`Some`) or clear (`None`) the bearer token for later requests
    fn set_token(&self, token: Option<String>);

    /// `POST /auth/login`
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthPayload>;

    /// `POST /auth/register`
    async fn register(&self, data: &RegisterRequest) -> Result<AuthPayload>;

    /// `POST /auth/logout` authenticated with `token`
    async fn logout(&self, token: &str) -> Result<()>;

    /// `GET /auth/me`
    async fn current_user(&self) -> Result<User>;

    /// `GET /users/me`
    async fn profile(&self) -> Result<UserProfile>;

    /// `PUT /users/me`
    async fn update_profile(&self, data: &UpdateProfileRequest) -> Result<UserProfile>;
}

#[async_trait]
impl SessionBackend for ApiClient {
    fn set_token(&self, token: Option<String>) {
        ApiClient::set_token(self, token);
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<AuthPayload> {
        AuthService::new(self).login(credentials).await
    }

    async fn register(&self, data: &RegisterRequest) -> Result<AuthPayload> {
        AuthService::new(self).register(data).await
    }

    async fn logout(&self, token: &str) -> Result<()> {
        AuthService::new(self).logout(token).await
    }

    async fn current_user(&self) -> Result<User> {
        AuthService::new(self).me().await
    }

    async fn profile(&self) -> Result<UserProfile> {
        UserService::new(self).get_profile().await
    }

    async fn update_profile(&self, data: &UpdateProfileRequest) -> Result<UserProfile> {
        UserService::new(self).update_profile(data).await
    }
}
