pub mod auth;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
///
/// /projects                            create
/// /projects/{id}                       get, update
/// /projects/{id}/picture               upload (PUT), delete
/// /projects/{id}/members               list
/// /projects/{id}/members/role          grant role (PUT)
/// /projects/{id}/members/apply         apply (POST), cancel (DELETE)
/// /projects/{id}/members/approve       approve (POST), disapprove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
}
