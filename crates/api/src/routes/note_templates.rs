//! Route definitions for note templates.
//!
//! Two routers are provided:
//! - `project_router()` for project-scoped routes mounted at `/projects`
//! - `router()` for template routes mounted at `/note-templates`

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::note_templates;
use crate::state::AppState;

/// Project-scoped routes mounted at `/projects`.
///
/// ```text
/// GET    /{project_id}/note-templates           -> list_visible
/// POST   /{project_id}/note-templates           -> create_note_template
/// GET    /{project_id}/note-templates/manage    -> list_for_management
/// ```
pub fn project_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{project_id}/note-templates",
            get(note_templates::list_visible).post(note_templates::create_note_template),
        )
        .route(
            "/{project_id}/note-templates/manage",
            get(note_templates::list_for_management),
        )
}

/// Template routes mounted at `/note-templates`.
///
/// ```text
/// POST   /load              -> load_note_template
/// GET    /{id}              -> get_note_template
/// PUT    /{id}              -> update_note_template
/// DELETE /{id}              -> delete_note_template
/// PUT    /{id}/position     -> reposition_note_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/load", post(note_templates::load_note_template))
        .route(
            "/{id}",
            get(note_templates::get_note_template)
                .put(note_templates::update_note_template)
                .delete(note_templates::delete_note_template),
        )
        .route("/{id}/position", put(note_templates::reposition_note_template))
}
