//! Repository for the `project_applicants` table.

use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use teamup_core::roster::RosterApplicant;
use teamup_core::types::DbId;

use crate::models::applicant::{ApplicantDisplay, ProjectApplicant};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, user_id, position, created_at, updated_at, deleted_at";

/// Provides operations for join requests.
pub struct ApplicantRepo;

impl ApplicantRepo {
    /// List every applicant row of a project, including withdrawn ones
    /// (re-applying revives the withdrawn row).
    pub async fn list_for_project(
        ex: impl PgExecutor<'_>,
        project_id: DbId,
    ) -> Result<Vec<ProjectApplicant>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM project_applicants WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, ProjectApplicant>(&query)
            .bind(project_id)
            .fetch_all(ex)
            .await
    }

    /// Insert or update one applicant row from its roster snapshot.
    pub async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        project_id: DbId,
        applicant: &RosterApplicant,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_applicants (project_id, user_id, position, deleted_at)
             VALUES ($1, $2, $3, CASE WHEN $4 THEN NOW() ELSE NULL END)
             ON CONFLICT ON CONSTRAINT uq_project_applicants_project_user_position
             DO UPDATE SET deleted_at = CASE
                 WHEN $4 THEN COALESCE(project_applicants.deleted_at, NOW())
                 ELSE NULL
             END",
        )
        .bind(project_id)
        .bind(applicant.user_id)
        .bind(&applicant.position)
        .bind(applicant.deleted)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Pending applicants of a project with usernames, for API responses and
    /// search documents.
    pub async fn list_display(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ApplicantDisplay>, sqlx::Error> {
        sqlx::query_as::<_, ApplicantDisplay>(
            "SELECT a.user_id, u.username, a.position
             FROM project_applicants a
             JOIN users u ON u.id = a.user_id
             WHERE a.project_id = $1 AND a.deleted_at IS NULL
             ORDER BY a.id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
