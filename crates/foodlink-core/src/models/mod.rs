//! Data models for the FoodLink client
//!
//! Wire types use camelCase JSON. Identity payloads from the backend come in
//! several shapes; they are all funnelled through [`AuthPayload`] and
//! converted into the single [`User`] type on receipt.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Response envelope
// ============================================================================

/// Standard backend response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

/// A response body that may or may not be wrapped in [`BaseResponse`].
///
/// An object with a `data` key next to `success` or `message` is the
/// wrapper; anything else is the bare payload.
#[derive(Debug, Clone)]
pub enum Envelope<T> {
    Wrapped(BaseResponse<T>),
    Bare(T),
}

impl<T> Envelope<T> {
    /// Unwrap the payload regardless of shape. A wrapper reporting
    /// `success: false` becomes [`Error::Api`] carrying its `message`.
    pub fn into_data(self) -> Result<T> {
        match self {
            Envelope::Bare(data) => Ok(data),
            Envelope::Wrapped(response) if !response.success => {
                let message = if response.message.trim().is_empty() {
                    "Request failed".to_string()
                } else {
                    response.message
                };
                Err(Error::api(200, message))
            }
            Envelope::Wrapped(response) => response
                .data
                .ok_or_else(|| Error::invalid_response("Response did not include data")),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let wrapped = value.as_object().is_some_and(|obj| {
            obj.contains_key("data") && (obj.contains_key("success") || obj.contains_key("message"))
        });

        if wrapped {
            serde_json::from_value(value)
                .map(Envelope::Wrapped)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Envelope::Bare)
                .map_err(D::Error::custom)
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Request body for `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Raw identity payload as sent by the backend.
///
/// Covers the login shape (`accessToken, tokenType, username, role`), the
/// register shape (`accessToken, tokenType, email, fullName, isAdmin`) and
/// the identity-only shape returned by `/auth/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub is_admin: Option<bool>,
}

impl AuthPayload {
    /// Normalize the identity fields into a [`User`]
    pub fn identity(&self) -> User {
        let is_admin = self.is_admin.unwrap_or_else(|| {
            self.role
                .as_deref()
                .is_some_and(|role| role.eq_ignore_ascii_case("admin"))
        });

        User {
            email: non_empty(&self.email),
            full_name: non_empty(&self.full_name),
            username: non_empty(&self.username),
            role: non_empty(&self.role),
            is_admin,
        }
    }
}

impl From<AuthPayload> for User {
    fn from(payload: AuthPayload) -> Self {
        payload.identity()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Normalized identity of the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub is_admin: bool,
}

impl User {
    /// Best human-readable name: full name, then username, then email
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Profile returned by `GET /users/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&UserProfile> for User {
    fn from(profile: &UserProfile) -> Self {
        User {
            email: Some(profile.email.clone()),
            full_name: Some(profile.full_name.clone()),
            username: None,
            role: None,
            is_admin: false,
        }
    }
}

/// Request body for `PUT /users/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// ============================================================================
// Family
// ============================================================================

/// Health condition from the backend catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCondition {
    pub id: String,
    pub code: String,
    pub name: String,
}

/// Relationship of a family member to the account holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    #[serde(rename = "self")]
    Myself,
    Father,
    Mother,
    Child,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Myself => "self",
            Relationship::Father => "father",
            Relationship::Mother => "mother",
            Relationship::Child => "child",
            Relationship::Other => "other",
        }
    }
}

impl FromStr for Relationship {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "self" => Ok(Relationship::Myself),
            "father" => Ok(Relationship::Father),
            "mother" => Ok(Relationship::Mother),
            "child" => Ok(Relationship::Child),
            "other" => Ok(Relationship::Other),
            _ => Err(format!(
                "Invalid relationship: {}. Use self, father, mother, child or other",
                s
            )),
        }
    }
}

impl Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("Invalid gender: {}. Use male, female or other", s)),
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(ActivityLevel::Low),
            "medium" => Ok(ActivityLevel::Medium),
            "high" => Ok(ActivityLevel::High),
            _ => Err(format!(
                "Invalid activity level: {}. Use low, medium or high",
                s
            )),
        }
    }
}

impl Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family member record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub display_name: String,
    pub relationship: Relationship,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub health_notes: Option<String>,
    #[serde(default)]
    pub health_conditions: Vec<HealthCondition>,
}

/// Accept `YYYY-MM-DD`, a datetime starting with one, an empty string or
/// null. Anything else is dropped rather than failing the whole record.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let date_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            log::debug!("[api] Ignoring unparseable birth date: {:?}", raw);
            None
        }
    }
}

/// Request body for creating or updating a family member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberRequest {
    pub display_name: String,
    pub relationship: Relationship,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_ids: Option<Vec<String>>,
}

impl FamilyMemberRequest {
    /// Minimal request with only the required fields set
    pub fn new(display_name: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            display_name: display_name.into(),
            relationship,
            gender: None,
            birth_date: None,
            height_cm: None,
            weight_kg: None,
            activity_level: None,
            health_notes: None,
            condition_ids: None,
        }
    }
}

impl From<&FamilyMember> for FamilyMemberRequest {
    fn from(member: &FamilyMember) -> Self {
        let condition_ids: Vec<String> = member
            .health_conditions
            .iter()
            .map(|c| c.id.clone())
            .collect();

        Self {
            display_name: member.display_name.clone(),
            relationship: member.relationship,
            gender: member.gender,
            birth_date: member.birth_date,
            height_cm: member.height_cm,
            weight_kg: member.weight_kg,
            activity_level: member.activity_level,
            health_notes: member.health_notes.clone(),
            condition_ids: Some(condition_ids),
        }
    }
}
