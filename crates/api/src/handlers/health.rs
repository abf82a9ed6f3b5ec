//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Returns 200 with a database round trip, so orchestration probes catch a
/// lost pool as well as a dead process.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    teamup_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
