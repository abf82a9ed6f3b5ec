//! HTTP integration tests for project creation, retrieval, update, and
//! picture handling.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_project, create_user, get, patch_json, project_payload,
    post_json, put_multipart,
};
use sqlx::PgPool;

/// Encode a blank RGBA image as PNG for upload tests.
fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_seeds_owner_and_ledger(pool: PgPool) {
    let (owner_id, token) = create_user(&pool, "owner").await;

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/projects",
        Some(&token),
        project_payload("Teamup"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["title"], "Teamup");
    assert_eq!(json["state"], "OPEN");

    // Ledger: DEV x2 with the creator's seat already taken.
    let slots = json["position_status"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["position"], "DEV");
    assert_eq!(slots[0]["open_cnt"], 2);
    assert_eq!(slots[0]["close_cnt"], 1);

    // Creator is the sole OWNER holding DEV.
    let members = json["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user_id"], owner_id);
    assert_eq!(members[0]["role"], "OWNER");
    assert_eq!(members[0]["positions"][0], "DEV");

    assert!(json["applicants"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_requires_auth(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app, "/api/v1/projects", None, project_payload("Nope")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_rejects_unknown_my_position(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;

    let mut payload = project_payload("Bad Position");
    payload["my_position"] = serde_json::json!("DESIGN");

    let app = build_test_app(pool);
    let response = post_json(app, "/api/v1/projects", Some(&token), payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_rejects_empty_positions(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;

    let mut payload = project_payload("No Positions");
    payload["positions"] = serde_json::json!([]);
    payload["my_position"] = serde_json::Value::Null;

    let app = build_test_app(pool);
    let response = post_json(app, "/api/v1/projects", Some(&token), payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_quota(pool: PgPool) {
    let (_, token) = create_user(&pool, "busy").await;

    // Test config allows involvement in 3 active projects.
    for i in 0..3 {
        create_project(&pool, &token, &format!("Project {i}")).await;
    }

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/projects",
        Some(&token),
        project_payload("One Too Many"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_project_includes_collections_by_default(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Readable").await;

    let app = build_test_app(pool);
    let response = get(app, &format!("/api/v1/projects/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["position_status"].is_array());
    assert!(json["members"].is_array());
    assert!(json["applicants"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_project_flags_skip_collections(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Lean").await;

    let app = build_test_app(pool);
    let response = get(
        app,
        &format!("/api/v1/projects/{id}?members=false&applicants=false"),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["position_status"].is_array());
    assert!(json.get("members").is_none());
    assert!(json.get("applicants").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_nonexistent_project_returns_404(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/projects/999999", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_title_as_owner(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Before").await;

    let app = build_test_app(pool);
    let response = patch_json(
        app,
        &format!("/api/v1/projects/{id}"),
        Some(&token),
        serde_json::json!({ "title": "After" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["title"], "After");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_by_outsider_is_forbidden(pool: PgPool) {
    let (_, owner_token) = create_user(&pool, "owner").await;
    let (_, outsider_token) = create_user(&pool, "outsider").await;
    let id = create_project(&pool, &owner_token, "Mine").await;

    let app = build_test_app(pool);
    let response = patch_json(
        app,
        &format!("/api/v1/projects/{id}"),
        Some(&outsider_token),
        serde_json::json!({ "title": "Yours Now" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_rejected_outside_open_state(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Frozen").await;

    sqlx::query("UPDATE projects SET state = 'STARTED' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let app = build_test_app(pool.clone());
    let response = patch_json(
        app,
        &format!("/api/v1/projects/{id}"),
        Some(&token),
        serde_json::json!({ "title": "Thawed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Row unchanged.
    let (title,): (String,) = sqlx::query_as("SELECT title FROM projects WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(title, "Frozen");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resize_removing_held_position_conflicts(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Resize").await;

    // The owner holds DEV, so replacing DEV with QA must fail.
    let app = build_test_app(pool.clone());
    let response = patch_json(
        app,
        &format!("/api/v1/projects/{id}"),
        Some(&token),
        serde_json::json!({ "positions": [{ "name": "QA", "count": 1 }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CAPACITY_CONFLICT");

    // Ledger unchanged.
    let app = build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/projects/{id}"), Some(&token)).await).await;
    let slots = json["position_status"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["position"], "DEV");
    assert_eq!(slots[0]["open_cnt"], 2);
    assert_eq!(slots[0]["close_cnt"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resize_grows_and_adds_positions(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Growing").await;

    let app = build_test_app(pool);
    let response = patch_json(
        app,
        &format!("/api/v1/projects/{id}"),
        Some(&token),
        serde_json::json!({
            "positions": [{ "name": "DEV", "count": 5 }, { "name": "QA", "count": 1 }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let slots = json["position_status"].as_array().unwrap();
    assert_eq!(slots.len(), 2);

    let dev = slots.iter().find(|s| s["position"] == "DEV").unwrap();
    assert_eq!(dev["open_cnt"], 5);
    assert_eq!(dev["close_cnt"], 1);
    let qa = slots.iter().find(|s| s["position"] == "QA").unwrap();
    assert_eq!(qa["open_cnt"], 1);
    assert_eq!(qa["close_cnt"], 0);
}

// ---------------------------------------------------------------------------
// Picture
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_and_delete_picture(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Pictured").await;

    let app = build_test_app(pool.clone());
    let response = put_multipart(
        app,
        &format!("/api/v1/projects/{id}/picture"),
        &token,
        "avatar",
        "avatar.png",
        "image/png",
        &png_bytes(256, 256),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let key = json["avatar"].as_str().unwrap();
    assert!(key.starts_with("project-pic/"));

    let app = build_test_app(pool.clone());
    let response = common::delete_json(
        app,
        &format!("/api/v1/projects/{id}/picture"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // No picture left to delete.
    let app = build_test_app(pool);
    let response = common::delete_json(
        app,
        &format!("/api/v1/projects/{id}/picture"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_rejects_non_image(pool: PgPool) {
    let (_, token) = create_user(&pool, "owner").await;
    let id = create_project(&pool, &token, "Text Avatar").await;

    let app = build_test_app(pool);
    let response = put_multipart(
        app,
        &format!("/api/v1/projects/{id}/picture"),
        &token,
        "avatar",
        "avatar.txt",
        "text/plain",
        b"not an image",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
