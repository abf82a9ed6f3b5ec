//! Position ledger row model.

use serde::Serialize;
use sqlx::FromRow;
use teamup_core::positions::PositionSlot;
use teamup_core::types::{DbId, Timestamp};

/// A ledger row from the `project_positions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PositionStatus {
    pub id: DbId,
    pub project_id: DbId,
    pub position: String,
    pub open_cnt: i32,
    pub close_cnt: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PositionStatus {
    /// Core snapshot view of this row.
    pub fn to_slot(&self) -> PositionSlot {
        PositionSlot {
            position: self.position.clone(),
            open_cnt: self.open_cnt,
            close_cnt: self.close_cnt,
        }
    }
}
