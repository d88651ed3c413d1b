//! Handlers for note templates.
//!
//! Listing for note entry, administrative CRUD and reordering, and content
//! loading for prefilling a note. All endpoints require authentication via
//! [`AuthUser`]; project-level permissions are checked against the store's
//! permission oracle before the store is touched.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ntpl_core::error::CoreError;
use ntpl_core::types::DbId;
use ntpl_db::models::note_template::{
    CreateNoteTemplate, LoadNoteTemplateRequest, NoteTemplateListParams, NoteTemplateLoad,
    RepositionNoteTemplate, UpdateNoteTemplate,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Payload of `POST /note-templates/load`.
#[derive(Debug, Serialize)]
pub struct LoadedNoteTemplate {
    pub note_template: NoteTemplateLoad,
}

// ---------------------------------------------------------------------------
// Permission checks
// ---------------------------------------------------------------------------

async fn require_show(state: &AppState, auth: &AuthUser, project_id: DbId) -> AppResult<()> {
    if state.store.oracle().can_show(auth.user_id, project_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not allowed to view note templates of this project".into(),
        )))
    }
}

async fn require_manage(state: &AppState, auth: &AuthUser, project_id: DbId) -> AppResult<()> {
    if state.store.oracle().can_manage(auth.user_id, project_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not allowed to manage note templates of this project".into(),
        )))
    }
}

/// Resolve the template's project, then check `can_manage` on it.
async fn require_manage_template(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<DbId> {
    let template = state.store.get(id).await?;
    require_manage(state, auth, template.project_id).await?;
    Ok(template.project_id)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{project_id}/note-templates?tracker_id=
///
/// Enabled templates of one tracker the caller may see, in manual order.
pub async fn list_visible(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<NoteTemplateListParams>,
) -> AppResult<impl IntoResponse> {
    let tracker_id = params
        .tracker_id
        .ok_or_else(|| CoreError::invalid_field("tracker_id", "is required"))?;

    require_show(&state, &auth, project_id).await?;

    let templates = state
        .store
        .visible_sorted(auth.user_id, project_id, tracker_id)
        .await?;

    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/projects/{project_id}/note-templates/manage[?tracker_id=]
///
/// Every template of the project, disabled ones included.
pub async fn list_for_management(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<NoteTemplateListParams>,
) -> AppResult<impl IntoResponse> {
    require_manage(&state, &auth, project_id).await?;

    let templates = state
        .store
        .list_for_project(project_id, params.tracker_id)
        .await?;

    Ok(Json(DataResponse { data: templates }))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{project_id}/note-templates
///
/// Create a template at the end of its group. The caller becomes the author.
pub async fn create_note_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateNoteTemplate>,
) -> AppResult<impl IntoResponse> {
    require_manage(&state, &auth, project_id).await?;

    let template = state
        .store
        .create(Some(auth.user_id), project_id, &input)
        .await?;

    tracing::info!(
        note_template_id = template.id,
        project_id,
        tracker_id = template.tracker_id,
        user_id = auth.user_id,
        "Note template created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /api/v1/note-templates/{id}
pub async fn get_note_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = state.store.get(id).await?;
    require_manage(&state, &auth, template.project_id).await?;

    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/note-templates/{id}
///
/// Partial update. A new `tracker_id` moves the template to the end of that
/// group; `position` reorders within the resulting group.
pub async fn update_note_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNoteTemplate>,
) -> AppResult<impl IntoResponse> {
    let project_id = require_manage_template(&state, &auth, id).await?;

    let template = state.store.update(id, &input).await?;

    tracing::info!(
        note_template_id = id,
        project_id,
        user_id = auth.user_id,
        "Note template updated",
    );

    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/note-templates/{id}/position
pub async fn reposition_note_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RepositionNoteTemplate>,
) -> AppResult<impl IntoResponse> {
    let project_id = require_manage_template(&state, &auth, id).await?;

    let template = state.store.reposition(id, input.position).await?;

    tracing::info!(
        note_template_id = id,
        project_id,
        position = template.position,
        user_id = auth.user_id,
        "Note template repositioned",
    );

    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/note-templates/{id}
///
/// Remove a template and close the gap it leaves in its group.
pub async fn delete_note_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project_id = require_manage_template(&state, &auth, id).await?;

    state.store.delete(id).await?;

    tracing::info!(
        note_template_id = id,
        project_id,
        user_id = auth.user_id,
        "Note template deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// POST /api/v1/note-templates/load
///
/// Return the content fields used to prefill a note. The caller needs the
/// show permission on the template's project; per-template visibility is not
/// re-checked. Without that permission the template reads as missing.
pub async fn load_note_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<LoadNoteTemplateRequest>,
) -> AppResult<impl IntoResponse> {
    let loaded = state.lookup.load(input.note_template_id).await?;
    if !state
        .store
        .oracle()
        .can_show(auth.user_id, loaded.project_id)
        .await?
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "NoteTemplate",
            id: input.note_template_id,
        }));
    }

    tracing::debug!(
        note_template_id = loaded.id,
        user_id = auth.user_id,
        "Note template served for prefill",
    );

    Ok(Json(DataResponse {
        data: LoadedNoteTemplate {
            note_template: loaded,
        },
    }))
}
