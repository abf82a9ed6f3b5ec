//! Repository for the `project_members` and `project_member_positions`
//! tables.

use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use teamup_core::project::ACTIVE_STATES;
use teamup_core::roster::{MemberPositionHold, RosterMember};
use teamup_core::types::DbId;

use crate::models::member::{MemberDisplay, MemberPosition, ProjectMember};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, user_id, role, created_at, updated_at, deleted_at";

/// Provides operations for project members and their position holds.
pub struct MemberRepo;

impl MemberRepo {
    /// List every member row of a project, including soft-deleted ones
    /// (the workflow revives them instead of inserting duplicates).
    pub async fn list_for_project(
        ex: impl PgExecutor<'_>,
        project_id: DbId,
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM project_members WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .fetch_all(ex)
            .await
    }

    /// List every position-hold row belonging to the given members,
    /// including soft-deleted ones.
    pub async fn list_positions(
        ex: impl PgExecutor<'_>,
        member_ids: &[DbId],
    ) -> Result<Vec<MemberPosition>, sqlx::Error> {
        sqlx::query_as::<_, MemberPosition>(
            "SELECT id, member_id, position, created_at, updated_at, deleted_at
             FROM project_member_positions WHERE member_id = ANY($1) ORDER BY id",
        )
        .bind(member_ids)
        .fetch_all(ex)
        .await
    }

    /// Insert or update one member row from its roster snapshot, returning
    /// the row id. Revival clears `deleted_at`; soft deletion stamps it once.
    pub async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        project_id: DbId,
        member: &RosterMember,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO project_members (project_id, user_id, role, deleted_at)
             VALUES ($1, $2, $3, CASE WHEN $4 THEN NOW() ELSE NULL END)
             ON CONFLICT ON CONSTRAINT uq_project_members_project_user
             DO UPDATE SET
                role = EXCLUDED.role,
                deleted_at = CASE
                    WHEN $4 THEN COALESCE(project_members.deleted_at, NOW())
                    ELSE NULL
                END
             RETURNING id",
        )
        .bind(project_id)
        .bind(member.user_id)
        .bind(member.role.name())
        .bind(member.deleted)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    /// Insert or update one position hold for a member.
    pub async fn upsert_position(
        tx: &mut Transaction<'_, Postgres>,
        member_id: DbId,
        hold: &MemberPositionHold,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_member_positions (member_id, position, deleted_at)
             VALUES ($1, $2, CASE WHEN $3 THEN NOW() ELSE NULL END)
             ON CONFLICT ON CONSTRAINT uq_project_member_positions_member_position
             DO UPDATE SET deleted_at = CASE
                 WHEN $3 THEN COALESCE(project_member_positions.deleted_at, NOW())
                 ELSE NULL
             END",
        )
        .bind(member_id)
        .bind(&hold.position)
        .bind(hold.deleted)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Count the non-terminal projects a user is an active member of.
    ///
    /// Feeds the involved-project quota at project creation.
    pub async fn count_active_involvements(
        ex: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let states: Vec<String> = ACTIVE_STATES.iter().map(|s| s.to_string()).collect();
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM project_members m
             JOIN projects p ON p.id = m.project_id
             WHERE m.user_id = $1
               AND m.deleted_at IS NULL
               AND p.deleted_at IS NULL
               AND p.state = ANY($2)",
        )
        .bind(user_id)
        .bind(&states)
        .fetch_one(ex)
        .await?;
        Ok(count)
    }

    /// Active members of a project with usernames and their actively-held
    /// position names, for API responses and search documents.
    pub async fn list_display(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<MemberDisplay>, sqlx::Error> {
        sqlx::query_as::<_, MemberDisplay>(
            "SELECT m.user_id, u.username, m.role,
                    COALESCE(
                        ARRAY_AGG(mp.position ORDER BY mp.position)
                            FILTER (WHERE mp.deleted_at IS NULL),
                        '{}'::TEXT[]
                    ) AS positions
             FROM project_members m
             JOIN users u ON u.id = m.user_id
             LEFT JOIN project_member_positions mp ON mp.member_id = m.id
             WHERE m.project_id = $1 AND m.deleted_at IS NULL
             GROUP BY m.id, m.user_id, u.username, m.role
             ORDER BY m.id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
