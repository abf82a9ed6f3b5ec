//! Project applicant model.

use serde::Serialize;
use sqlx::FromRow;
use teamup_core::roster::RosterApplicant;
use teamup_core::types::{DbId, Timestamp};

/// An applicant row from the `project_applicants` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectApplicant {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub position: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProjectApplicant {
    /// Core snapshot view of this row.
    pub fn to_roster(&self) -> RosterApplicant {
        RosterApplicant {
            user_id: self.user_id,
            position: self.position.clone(),
            deleted: self.deleted_at.is_some(),
        }
    }
}

/// Pending applicant joined with display data for API responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApplicantDisplay {
    pub user_id: DbId,
    pub username: String,
    pub position: String,
}
