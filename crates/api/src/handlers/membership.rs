//! Handlers for the `/projects/{id}/members` workflow: listing, role
//! changes, and the apply/approve pipeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use teamup_core::types::DbId;
use teamup_db::models::member::{ApplyRequest, ApproveRequest, GrantRoleRequest, MemberDisplay};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::workflow;

/// GET /api/v1/projects/{id}/members
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<MemberDisplay>>> {
    let members = workflow::list_members(&state, id).await?;
    Ok(Json(members))
}

/// PUT /api/v1/projects/{id}/members/role
pub async fn grant_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<GrantRoleRequest>,
) -> AppResult<StatusCode> {
    workflow::grant_role(&state, auth.user_id, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/members/apply
pub async fn apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApplyRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;
    workflow::apply(&state, auth.user_id, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/projects/{id}/members/apply
pub async fn cancel_apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApplyRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;
    workflow::cancel_apply(&state, auth.user_id, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/members/approve
pub async fn approve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApproveRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;
    workflow::approve(&state, auth.user_id, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/projects/{id}/members/approve
pub async fn disapprove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApproveRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;
    workflow::disapprove(&state, auth.user_id, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}
