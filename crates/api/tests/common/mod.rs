#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use ntpl_api::auth::jwt::{generate_access_token, JwtConfig};
use ntpl_api::config::ServerConfig;
use ntpl_api::router::build_app_router;
use ntpl_api::state::AppState;
use ntpl_core::permissions::{NOTE_TEMPLATE_PERMISSIONS, PERMISSION_SHOW_NOTE_TEMPLATES};
use ntpl_core::types::DbId;
use ntpl_db::models::member::CreateMember;
use ntpl_db::models::project::{CreateProject, Project};
use ntpl_db::models::role::{CreateRole, Role};
use ntpl_db::models::tracker::{CreateTracker, Tracker};
use ntpl_db::models::user::{CreateUser, User};
use ntpl_db::repositories::{MemberRepo, ProjectRepo, RoleRepo, TrackerRepo, UserRepo};
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router, with the production middleware stack
/// and the Postgres-backed permission oracle, over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

/// A bearer token for `user_id` signed with the test secret.
pub fn token_for(user_id: DbId) -> String {
    generate_access_token(user_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// A project with one enabled tracker and two roles: `Manager` (show + edit)
/// and `Reporter` (show only).
pub struct Seed {
    pub project: Project,
    pub tracker: Tracker,
    pub manager_role: Role,
    pub reporter_role: Role,
}

pub async fn seed(pool: &PgPool) -> Seed {
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            identifier: "ecookbook".to_string(),
            name: "eCookbook".to_string(),
        },
    )
    .await
    .unwrap();
    let tracker = TrackerRepo::create(pool, &CreateTracker { name: "Bug".to_string() })
        .await
        .unwrap();
    ProjectRepo::enable_tracker(pool, project.id, tracker.id)
        .await
        .unwrap();

    let manager_role = RoleRepo::create(
        pool,
        &CreateRole {
            name: "Manager".to_string(),
            permissions: NOTE_TEMPLATE_PERMISSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        },
    )
    .await
    .unwrap();
    let reporter_role = RoleRepo::create(
        pool,
        &CreateRole {
            name: "Reporter".to_string(),
            permissions: vec![PERMISSION_SHOW_NOTE_TEMPLATES.to_string()],
        },
    )
    .await
    .unwrap();

    Seed {
        project,
        tracker,
        manager_role,
        reporter_role,
    }
}

/// Create a user and, when `role_id` is given, make them a project member.
pub async fn user_with_role(
    pool: &PgPool,
    login: &str,
    project_id: DbId,
    role_id: Option<DbId>,
) -> User {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            login: login.to_string(),
            is_admin: Some(false),
        },
    )
    .await
    .unwrap();
    if let Some(role_id) = role_id {
        MemberRepo::create(
            pool,
            &CreateMember {
                project_id,
                user_id: user.id,
                role_ids: vec![role_id],
            },
        )
        .await
        .unwrap();
    }
    user
}
