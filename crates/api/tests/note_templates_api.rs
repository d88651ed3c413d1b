//! HTTP-level integration tests for the note template endpoints.
//!
//! Users, roles, and memberships are seeded through the repository layer;
//! every template operation then goes through the router with a bearer token
//! and the Postgres permission oracle.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete, get, get_auth, post_json, put_json, seed, token_for, user_with_role, Seed,
};
use ntpl_core::types::DbId;
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Actors {
    seed: Seed,
    manager: String,
    reporter: String,
    outsider: String,
    reporter_id: DbId,
}

async fn actors(pool: &PgPool) -> Actors {
    let seed = seed(pool).await;
    let manager =
        user_with_role(pool, "jsmith", seed.project.id, Some(seed.manager_role.id)).await;
    let reporter =
        user_with_role(pool, "dlopper", seed.project.id, Some(seed.reporter_role.id)).await;
    let outsider = user_with_role(pool, "rhill", seed.project.id, None).await;

    Actors {
        manager: token_for(manager.id),
        reporter: token_for(reporter.id),
        outsider: token_for(outsider.id),
        reporter_id: reporter.id,
        seed,
    }
}

fn visible_uri(a: &Actors) -> String {
    format!(
        "/api/v1/projects/{}/note-templates?tracker_id={}",
        a.seed.project.id, a.seed.tracker.id
    )
}

fn create_uri(a: &Actors) -> String {
    format!("/api/v1/projects/{}/note-templates", a.seed.project.id)
}

async fn create_template(pool: &PgPool, a: &Actors, body: Value) -> Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &create_uri(a), &a.manager, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn open_template(a: &Actors, name: &str) -> Value {
    json!({
        "tracker_id": a.seed.tracker.id,
        "name": name,
        "description": "Note template description",
        "memo": format!("Memo of {name}"),
        "visibility": "open",
    })
}

async fn listed_names(pool: &PgPool, a: &Actors, token: &str) -> Vec<String> {
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &visible_uri(a), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Authentication and authorization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_requires_a_token(pool: PgPool) {
    let a = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app, &visible_uri(&a)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_without_show_permission_is_forbidden(pool: PgPool) {
    let a = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, &visible_uri(&a), &a.outsider).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reporter_cannot_create(pool: PgPool) {
    let a = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(app, &create_uri(&a), &a.reporter, open_template(&a, "A")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_without_tracker_is_a_validation_error(pool: PgPool) {
    let a = actors(&pool).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/projects/{}/note-templates", a.seed.project.id);

    let response = get_auth(app, &uri, &a.reporter).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "tracker_id");
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn moving_last_template_first_changes_listing(pool: PgPool) {
    let a = actors(&pool).await;
    for idx in 1..=3 {
        create_template(&pool, &a, open_template(&a, &format!("Note Template name {idx}"))).await;
    }

    assert_eq!(
        listed_names(&pool, &a, &a.reporter).await,
        vec![
            "Note Template name 1",
            "Note Template name 2",
            "Note Template name 3"
        ]
    );

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &visible_uri(&a), &a.reporter).await;
    let last_id = body_json(response).await["data"][2]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/note-templates/{last_id}/position"),
        &a.manager,
        json!({ "position": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["position"], 1);

    assert_eq!(
        listed_names(&pool, &a, &a.reporter).await,
        vec![
            "Note Template name 3",
            "Note Template name 1",
            "Note Template name 2"
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_position_is_unprocessable(pool: PgPool) {
    let a = actors(&pool).await;
    let created = create_template(&pool, &a, open_template(&a, "A")).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/note-templates/{id}/position"),
        &a.manager,
        json!({ "position": 5 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INVALID_POSITION");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_closes_the_gap(pool: PgPool) {
    let a = actors(&pool).await;
    let first = create_template(&pool, &a, open_template(&a, "A")).await;
    create_template(&pool, &a, open_template(&a, "B")).await;
    create_template(&pool, &a, open_template(&a, "C")).await;
    let id = first["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/note-templates/{id}"), &a.manager).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &visible_uri(&a), &a.reporter).await;
    let json = body_json(response).await;
    let positions: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 2]);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/note-templates/{id}"), &a.manager).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_create_lists_field_errors(pool: PgPool) {
    let a = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        &create_uri(&a),
        &a.manager,
        json!({ "name": "", "memo": "Test memo" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let fields: Vec<_> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"name".to_string()));
    assert!(fields.contains(&"tracker_id".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_role_ids_are_a_validation_error(pool: PgPool) {
    let a = actors(&pool).await;
    let mut body = open_template(&a, "Restricted");
    body["visibility"] = json!("roles");
    body["role_ids"] = json!([a.seed.reporter_role.id, 999_999]);

    let app = common::build_test_app(pool);
    let response = post_json(app, &create_uri(&a), &a.manager, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"][0]["field"], "role_ids");
    assert_eq!(json["details"][0]["message"], "contains unknown roles");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_rejects_unknown_visibility(pool: PgPool) {
    let a = actors(&pool).await;
    let created = create_template(&pool, &a, open_template(&a, "A")).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/note-templates/{id}"),
        &a.manager,
        json!({ "visibility": "everyone" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"][0]["field"], "visibility");
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn restricted_templates_follow_roles_and_authorship(pool: PgPool) {
    let a = actors(&pool).await;
    create_template(&pool, &a, open_template(&a, "open")).await;
    create_template(
        &pool,
        &a,
        json!({
            "tracker_id": a.seed.tracker.id,
            "name": "managers only",
            "memo": "m",
            "visibility": "roles",
            "role_ids": [a.seed.manager_role.id],
        }),
    )
    .await;
    create_template(
        &pool,
        &a,
        json!({
            "tracker_id": a.seed.tracker.id,
            "name": "authored by manager",
            "memo": "m",
            "visibility": "mine",
        }),
    )
    .await;
    create_template(
        &pool,
        &a,
        json!({
            "tracker_id": a.seed.tracker.id,
            "name": "disabled",
            "memo": "m",
            "enabled": false,
        }),
    )
    .await;

    assert_eq!(
        listed_names(&pool, &a, &a.manager).await,
        vec!["open", "managers only", "authored by manager"]
    );
    assert_eq!(listed_names(&pool, &a, &a.reporter).await, vec!["open"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn management_listing_includes_disabled(pool: PgPool) {
    let a = actors(&pool).await;
    create_template(&pool, &a, open_template(&a, "enabled")).await;
    let mut disabled = open_template(&a, "disabled");
    disabled["enabled"] = json!(false);
    create_template(&pool, &a, disabled).await;

    let uri = format!("/api/v1/projects/{}/note-templates/manage", a.seed.project.id);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &uri, &a.manager).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &uri, &a.reporter).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn load_returns_prefill_fields(pool: PgPool) {
    let a = actors(&pool).await;
    let created = create_template(
        &pool,
        &a,
        json!({
            "tracker_id": a.seed.tracker.id,
            "name": "Note template name",
            "description": "Note template description",
            "memo": "Test memo",
            "visibility": "mine",
        }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    // Not visible to the reporter in listings, but loadable by id.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/note-templates/load",
        &a.reporter,
        json!({ "note_template_id": id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let loaded = &json["data"]["note_template"];
    assert_eq!(loaded["id"], id);
    assert_eq!(loaded["name"], "Note template name");
    assert_eq!(loaded["description"], "Note template description");
    assert_eq!(loaded["memo"], "Test memo");
    assert_eq!(loaded["tracker_id"], a.seed.tracker.id);
    assert!(loaded.get("project_id").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn load_unknown_template_is_not_found(pool: PgPool) {
    let a = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/note-templates/load",
        &a.reporter,
        json!({ "note_template_id": 424242 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn load_without_show_permission_reads_as_missing(pool: PgPool) {
    let a = actors(&pool).await;
    let created = create_template(&pool, &a, open_template(&a, "A")).await;

    let existing = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/note-templates/load",
        &a.outsider,
        json!({ "note_template_id": created["id"] }),
    )
    .await;
    let missing = post_json(
        common::build_test_app(pool),
        "/api/v1/note-templates/load",
        &a.outsider,
        json!({ "note_template_id": 987_654 }),
    )
    .await;

    assert_eq!(existing.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(existing).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn created_template_records_author(pool: PgPool) {
    let a = actors(&pool).await;
    let created = create_template(&pool, &a, open_template(&a, "A")).await;

    assert!(created["author_id"].is_i64());
    assert_ne!(created["author_id"], a.reporter_id);
    assert_eq!(created["position"], 1);
    assert_eq!(created["enabled"], true);
}
