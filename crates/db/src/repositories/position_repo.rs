//! Repository for the `project_positions` ledger table.

use sqlx::{PgExecutor, Postgres, Transaction};
use teamup_core::positions::PositionSlot;
use teamup_core::types::DbId;

use crate::models::position::PositionStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, position, open_cnt, close_cnt, created_at, updated_at";

/// Provides operations for position ledger rows.
pub struct PositionRepo;

impl PositionRepo {
    /// List a project's ledger rows in insertion order.
    pub async fn list_for_project(
        ex: impl PgExecutor<'_>,
        project_id: DbId,
    ) -> Result<Vec<PositionStatus>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM project_positions WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, PositionStatus>(&query)
            .bind(project_id)
            .fetch_all(ex)
            .await
    }

    /// Write every ledger slot, inserting new position names and updating
    /// the counts of existing ones.
    ///
    /// Part of a workflow write-set; must run inside the caller's
    /// transaction so ledger counts and membership rows commit together.
    pub async fn upsert_slots(
        tx: &mut Transaction<'_, Postgres>,
        project_id: DbId,
        slots: &[PositionSlot],
    ) -> Result<(), sqlx::Error> {
        for slot in slots {
            sqlx::query(
                "INSERT INTO project_positions (project_id, position, open_cnt, close_cnt)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT ON CONSTRAINT uq_project_positions_project_position
                 DO UPDATE SET open_cnt = EXCLUDED.open_cnt, close_cnt = EXCLUDED.close_cnt",
            )
            .bind(project_id)
            .bind(&slot.position)
            .bind(slot.open_cnt)
            .bind(slot.close_cnt)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
