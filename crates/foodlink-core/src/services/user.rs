//! Profile endpoints (`/users/me`)

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Envelope, UpdateProfileRequest, UserProfile};

pub struct UserService<'a> {
    client: &'a ApiClient,
}

impl<'a> UserService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_profile(&self) -> Result<UserProfile> {
        let response: Envelope<UserProfile> = self.client.get("/users/me").await?;
        response.into_data()
    }

    pub async fn update_profile(&self, data: &UpdateProfileRequest) -> Result<UserProfile> {
        let response: Envelope<UserProfile> = self.client.put("/users/me", data).await?;
        response.into_data()
    }
}
