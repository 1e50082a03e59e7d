//! Family member and health condition endpoints

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::{Envelope, FamilyMember, FamilyMemberRequest, HealthCondition};

pub struct FamilyService<'a> {
    client: &'a ApiClient,
}

impl<'a> FamilyService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_members(&self) -> Result<Vec<FamilyMember>> {
        let response: Envelope<Vec<FamilyMember>> = self.client.get("/family").await?;
        response.into_data()
    }

    /// Look up one member by id from the full list
    pub async fn get_member(&self, id: &str) -> Result<FamilyMember> {
        self.list_members()
            .await?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::api(404, format!("Family member not found: {}", id)))
    }

    pub async fn add_member(&self, data: &FamilyMemberRequest) -> Result<FamilyMember> {
        let response: Envelope<FamilyMember> = self.client.post("/family", data).await?;
        response.into_data()
    }

    pub async fn update_member(&self, id: &str, data: &FamilyMemberRequest) -> Result<FamilyMember> {
        let path = member_path(id)?;
        let response: Envelope<FamilyMember> = self.client.put(&path, data).await?;
        response.into_data()
    }

    pub async fn delete_member(&self, id: &str) -> Result<()> {
        let path = member_path(id)?;
        let _: Value = self.client.delete(&path).await?;
        Ok(())
    }

    pub async fn list_conditions(&self) -> Result<Vec<HealthCondition>> {
        let response: Envelope<Vec<HealthCondition>> =
            self.client.get("/family/conditions").await?;
        response.into_data()
    }
}

/// Ids are opaque but must stay a single path segment
fn member_path(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') || id.contains('?') || id.contains('#') {
        return Err(Error::InvalidArgument(format!("Invalid family member id: '{}'", id)));
    }
    Ok(format!("/family/{}", id))
}
