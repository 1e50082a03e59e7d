//! Authentication endpoints
//!
//! `/auth/login`, `/auth/register`, `/auth/logout` and `/auth/me`.

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{AuthPayload, Envelope, LoginRequest, RegisterRequest, User};

pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthPayload> {
        let response: Envelope<AuthPayload> = self.client.post("/auth/login", credentials).await?;
        response.into_data()
    }

    /// Create an account. The backend may or may not return a token; it is
    /// never used to open a session.
    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthPayload> {
        let response: Envelope<AuthPayload> = self.client.post("/auth/register", data).await?;
        response.into_data()
    }

    /// Invalidate `token` on the server
    pub async fn logout(&self, token: &str) -> Result<()> {
        let _: Value = self
            .client
            .post_with_auth("/auth/logout", &serde_json::json!({}), token)
            .await?;
        Ok(())
    }

    /// Identity of the holder of the installed token
    pub async fn me(&self) -> Result<User> {
        let response: Envelope<AuthPayload> = self.client.get("/auth/me").await?;
        Ok(response.into_data()?.identity())
    }
}
