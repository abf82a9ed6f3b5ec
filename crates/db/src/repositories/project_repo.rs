//! Repository for the `projects` table.

use sqlx::{PgExecutor, Postgres, Transaction};
use teamup_core::types::DbId;

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, state, title, description_html, team_intro_html, profit_share, \
     languages, skills, tags, avatar, begin_at, period, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in the default OPEN state, returning the row.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, description_html, team_intro_html, profit_share,
                                   languages, skills, tags, begin_at, period)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.description_html)
            .bind(&input.team_intro_html)
            .bind(&input.profit_share)
            .bind(&input.languages)
            .bind(&input.skills)
            .bind(&input.tags)
            .bind(input.begin_at)
            .bind(input.period)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a project by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        ex: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(ex)
            .await
    }

    /// Find a project by ID and take a row lock for the current transaction.
    ///
    /// Every mutating workflow locks the project first so concurrent
    /// mutations of the same project serialize, making the capacity checks
    /// that follow authoritative rather than a stale read.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Apply the scalar field patches of `input`. Only non-`None` fields are
    /// written; `positions` is handled separately by the workflow.
    pub async fn update_fields(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description_html = COALESCE($3, description_html),
                team_intro_html = COALESCE($4, team_intro_html),
                profit_share = COALESCE($5, profit_share),
                languages = COALESCE($6, languages),
                skills = COALESCE($7, skills),
                tags = COALESCE($8, tags),
                begin_at = COALESCE($9, begin_at),
                period = COALESCE($10, period)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description_html)
            .bind(&input.team_intro_html)
            .bind(&input.profit_share)
            .bind(&input.languages)
            .bind(&input.skills)
            .bind(&input.tags)
            .bind(input.begin_at)
            .bind(input.period)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Set (or clear) the avatar reference. Returns `None` for unknown ids.
    pub async fn set_avatar(
        ex: impl PgExecutor<'_>,
        id: DbId,
        avatar: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET avatar = $2 WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(avatar)
            .fetch_optional(ex)
            .await
    }
}
