//! Route definitions for the `/projects` resource, including the nested
//! membership workflow routes.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{membership, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PATCH  /{id}                    -> update
/// PUT    /{id}/picture            -> upload_picture
/// DELETE /{id}/picture            -> delete_picture
///
/// GET    /{id}/members            -> list
/// PUT    /{id}/members/role       -> grant_role
/// POST   /{id}/members/apply      -> apply
/// DELETE /{id}/members/apply      -> cancel_apply
/// POST   /{id}/members/approve    -> approve
/// DELETE /{id}/members/approve    -> disapprove
/// ```
pub fn router() -> Router<AppState> {
    let member_routes = Router::new()
        .route("/", get(membership::list))
        .route("/role", put(membership::grant_role))
        .route(
            "/apply",
            post(membership::apply).delete(membership::cancel_apply),
        )
        .route(
            "/approve",
            post(membership::approve).delete(membership::disapprove),
        );

    Router::new()
        .route("/", post(project::create))
        .route("/{id}", get(project::get_by_id).patch(project::update))
        .route(
            "/{id}/picture",
            put(project::upload_picture).delete(project::delete_picture),
        )
        .nest("/{id}/members", member_routes)
}
