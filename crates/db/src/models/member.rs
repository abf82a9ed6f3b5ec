//! Project member and member-position models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teamup_core::error::CoreError;
use teamup_core::project::MemberRole;
use teamup_core::roster::{MemberPositionHold, RosterMember};
use teamup_core::types::{DbId, Timestamp};
use validator::Validate;

/// A member row from the `project_members` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectMember {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// A position-hold row from the `project_member_positions` table.
#[derive(Debug, Clone, FromRow)]
pub struct MemberPosition {
    pub id: DbId,
    pub member_id: DbId,
    pub position: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProjectMember {
    /// Core snapshot view of this member with its position holds.
    ///
    /// `holds` may contain rows of other members; only this member's rows
    /// are taken.
    pub fn to_roster(&self, holds: &[MemberPosition]) -> Result<RosterMember, CoreError> {
        Ok(RosterMember {
            id: Some(self.id),
            user_id: self.user_id,
            role: MemberRole::from_name(&self.role)?,
            deleted: self.deleted_at.is_some(),
            positions: holds
                .iter()
                .filter(|h| h.member_id == self.id)
                .map(|h| MemberPositionHold {
                    position: h.position.clone(),
                    deleted: h.deleted_at.is_some(),
                })
                .collect(),
        })
    }
}

/// Active member joined with display data for API responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberDisplay {
    pub user_id: DbId,
    pub username: String,
    pub role: String,
    /// Actively-held position names.
    pub positions: Vec<String>,
}

/// Request body for apply / cancel-apply.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    #[validate(length(min = 1))]
    pub position: String,
}

/// Request body for approve / disapprove.
#[derive(Debug, Deserialize, Validate)]
pub struct ApproveRequest {
    pub user_id: DbId,
    #[validate(length(min = 1))]
    pub position: String,
}

/// Request body for the role-grant operation.
#[derive(Debug, Deserialize)]
pub struct GrantRoleRequest {
    pub user_id: DbId,
    pub role: MemberRole,
}
