//! Family commands
//!
//! Manage family member records and look up the health condition catalogue.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use foodlink_core::{
    ActivityLevel, FamilyMember, FamilyMemberRequest, FamilyService, Gender, HealthCondition,
    Relationship,
};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{or_dash, print_output, print_single, print_success};

#[derive(Subcommand)]
pub enum FamilyAction {
    /// List family members
    List,

    /// Add a family member
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Relationship: self, father, mother, child or other
        #[arg(long, short)]
        relationship: Relationship,

        #[command(flatten)]
        details: MemberDetails,
    },

    /// Update a family member (only the given fields change)
    Update {
        /// Member ID
        id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Relationship: self, father, mother, child or other
        #[arg(long, short)]
        relationship: Option<Relationship>,

        #[command(flatten)]
        details: MemberDetails,

        /// Remove every health condition from the member
        #[arg(long, conflicts_with = "conditions")]
        clear_conditions: bool,
    },

    /// Remove a family member
    Remove {
        /// Member ID
        id: String,
    },

    /// List known health conditions
    Conditions,
}

/// Optional member fields shared by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct MemberDetails {
    /// Gender: male, female or other
    #[arg(long)]
    gender: Option<Gender>,

    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    birth_date: Option<NaiveDate>,

    /// Height in centimetres
    #[arg(long)]
    height: Option<f64>,

    /// Weight in kilograms
    #[arg(long)]
    weight: Option<f64>,

    /// Activity level: low, medium or high
    #[arg(long)]
    activity: Option<ActivityLevel>,

    /// Free-form health notes
    #[arg(long)]
    notes: Option<String>,

    /// Health condition ID (repeatable)
    #[arg(long = "condition")]
    conditions: Vec<String>,
}

impl MemberDetails {
    /// Overlay the given fields onto `request`
    fn apply(self, request: &mut FamilyMemberRequest) {
        if let Some(gender) = self.gender {
            request.gender = Some(gender);
        }
        if let Some(date) = self.birth_date {
            request.birth_date = Some(date);
        }
        if let Some(height) = self.height {
            request.height_cm = Some(height);
        }
        if let Some(weight) = self.weight {
            request.weight_kg = Some(weight);
        }
        if let Some(activity) = self.activity {
            request.activity_level = Some(activity);
        }
        if let Some(notes) = self.notes {
            request.health_notes = Some(notes);
        }
        if !self.conditions.is_empty() {
            request.condition_ids = Some(self.conditions);
        }
    }
}

/// Build the full update body from the stored member plus the given changes
fn update_request(
    existing: &FamilyMember,
    name: Option<String>,
    relationship: Option<Relationship>,
    details: MemberDetails,
    clear_conditions: bool,
) -> FamilyMemberRequest {
    let mut request = FamilyMemberRequest::from(existing);
    if let Some(name) = name {
        request.display_name = name;
    }
    if let Some(relationship) = relationship {
        request.relationship = relationship;
    }
    details.apply(&mut request);
    if clear_conditions {
        request.condition_ids = Some(Vec::new());
    }
    request
}

/// Family member row for table display
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Relationship")]
    pub relationship: String,
    #[tabled(rename = "Gender")]
    pub gender: String,
    #[tabled(rename = "Born")]
    pub birth_date: String,
    #[tabled(rename = "Height")]
    pub height_cm: String,
    #[tabled(rename = "Weight")]
    pub weight_kg: String,
    #[tabled(rename = "Activity")]
    pub activity_level: String,
    #[tabled(rename = "Conditions")]
    pub conditions: String,
}

impl From<&FamilyMember> for MemberRow {
    fn from(member: &FamilyMember) -> Self {
        let conditions: Vec<&str> = member
            .health_conditions
            .iter()
            .map(|c| c.name.as_str())
            .collect();

        Self {
            id: member.id.clone(),
            name: member.display_name.clone(),
            relationship: member.relationship.to_string(),
            gender: or_dash(member.gender),
            birth_date: or_dash(member.birth_date),
            height_cm: or_dash(member.height_cm),
            weight_kg: or_dash(member.weight_kg),
            activity_level: or_dash(member.activity_level),
            conditions: if conditions.is_empty() {
                "-".to_string()
            } else {
                conditions.join(", ")
            },
        }
    }
}

/// Health condition row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ConditionRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Name")]
    pub name: String,
}

impl From<HealthCondition> for ConditionRow {
    fn from(condition: HealthCondition) -> Self {
        Self {
            id: condition.id,
            code: condition.code,
            name: condition.name,
        }
    }
}

pub async fn execute(ctx: &Context, action: FamilyAction) -> Result<()> {
    ctx.require_login()?;
    let family = FamilyService::new(ctx.client());

    match action {
        FamilyAction::List => {
            let members = family.list_members().await?;
            let rows: Vec<MemberRow> = members.iter().map(MemberRow::from).collect();
            print_output(&rows, ctx.format)
        }

        FamilyAction::Add {
            name,
            relationship,
            details,
        } => {
            let mut request = FamilyMemberRequest::new(name, relationship);
            details.apply(&mut request);

            let member = family.add_member(&request).await?;
            print_success(&format!("Added {} ({})", member.display_name, member.id), ctx.quiet);
            print_single(&MemberRow::from(&member), ctx.format)
        }

        FamilyAction::Update {
            id,
            name,
            relationship,
            details,
            clear_conditions,
        } => {
            let existing = family.get_member(&id).await?;
            let request = update_request(&existing, name, relationship, details, clear_conditions);

            let member = family.update_member(&id, &request).await?;
            print_success(&format!("Updated {}", member.display_name), ctx.quiet);
            print_single(&MemberRow::from(&member), ctx.format)
        }

        FamilyAction::Remove { id } => {
            family.delete_member(&id).await?;
            print_success(&format!("Removed family member {}", id), ctx.quiet);
            Ok(())
        }

        FamilyAction::Conditions => {
            let rows: Vec<ConditionRow> = family
                .list_conditions()
                .await?
                .into_iter()
                .map(ConditionRow::from)
                .collect();
            print_output(&rows, ctx.format)
        }
    }
}
