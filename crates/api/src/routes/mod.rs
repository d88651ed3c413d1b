pub mod health;
pub mod note_templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects/{project_id}/note-templates             visible list, create
/// /projects/{project_id}/note-templates/manage      administrative list
///
/// /note-templates/load                              load for prefill (POST)
/// /note-templates/{id}                              get, update, delete
/// /note-templates/{id}/position                     reposition (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", note_templates::project_router())
        .nest("/note-templates", note_templates::router())
}
