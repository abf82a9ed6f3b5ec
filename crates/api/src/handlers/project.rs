//! Handlers for the `/projects` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use teamup_core::types::DbId;
use teamup_db::models::project::{
    CreateProject, ProjectPicResponse, ProjectResponse, UpdateProject,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ProjectLoadParams;
use crate::state::AppState;
use crate::workflow;

/// POST /api/v1/projects
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    input.validate()?;
    let project = workflow::create_project(&state, auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ProjectLoadParams>,
) -> AppResult<Json<ProjectResponse>> {
    let project = workflow::get_project(&state, id, &params).await?;
    Ok(Json(project))
}

/// PATCH /api/v1/projects/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<ProjectResponse>> {
    input.validate()?;
    let project = workflow::update_project(&state, auth.user_id, id, input).await?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}/picture
///
/// Multipart upload; the picture is expected in an `avatar` file field.
pub async fn upload_picture(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<ProjectPicResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("avatar") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((content_type, data.to_vec()));
        }
    }

    let (content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing 'avatar' file field".into()))?;

    let response = workflow::upload_picture(&state, auth.user_id, id, bytes, &content_type).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/projects/{id}/picture
pub async fn delete_picture(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    workflow::delete_picture(&state, auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
