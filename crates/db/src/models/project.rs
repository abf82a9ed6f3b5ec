//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teamup_core::positions::PositionRequest;
use teamup_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::applicant::ApplicantDisplay;
use crate::models::member::MemberDisplay;
use crate::models::position::PositionStatus;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub state: String,
    pub title: String,
    pub description_html: String,
    pub team_intro_html: Option<String>,
    pub profit_share: Option<String>,
    pub languages: Vec<String>,
    pub skills: Vec<String>,
    pub tags: Vec<String>,
    pub avatar: Option<String>,
    pub begin_at: Option<Timestamp>,
    pub period: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One requested position with its capacity.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PositionInput {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub count: i32,
}

impl PositionInput {
    pub fn to_request(&self) -> PositionRequest {
        PositionRequest {
            name: self.name.clone(),
            count: self.count,
        }
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description_html: String,
    pub team_intro_html: Option<String>,
    pub profit_share: Option<String>,
    #[validate(length(min = 1))]
    pub languages: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(length(min = 1))]
    pub tags: Vec<String>,
    pub begin_at: Option<Timestamp>,
    #[validate(range(min = 1))]
    pub period: Option<i32>,
    #[validate(length(min = 1), nested)]
    pub positions: Vec<PositionInput>,
    /// Position the creator takes immediately, if any. Must match one of
    /// `positions` (case-insensitive).
    pub my_position: Option<String>,
}

/// DTO for updating an existing project. All fields are optional; `positions`
/// triggers a ledger resize.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description_html: Option<String>,
    pub team_intro_html: Option<String>,
    pub profit_share: Option<String>,
    #[validate(length(min = 1))]
    pub languages: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    #[validate(length(min = 1))]
    pub tags: Option<Vec<String>>,
    pub begin_at: Option<Timestamp>,
    #[validate(range(min = 1))]
    pub period: Option<i32>,
    #[validate(length(min = 1), nested)]
    pub positions: Option<Vec<PositionInput>>,
}

/// Project plus the optionally-loaded child collections.
///
/// Collections that were not requested are omitted from the JSON entirely.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_status: Option<Vec<PositionStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<MemberDisplay>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicants: Option<Vec<ApplicantDisplay>>,
}

/// Response body for picture upload: the project id and its new avatar key.
#[derive(Debug, Serialize)]
pub struct ProjectPicResponse {
    pub id: DbId,
    pub avatar: Option<String>,
}
