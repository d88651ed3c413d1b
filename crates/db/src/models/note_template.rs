//! Note template model and DTOs.

use ntpl_core::access::{FilterCandidate, TemplateRef};
use ntpl_core::note_template::Visibility;
use ntpl_core::positioning::Positioned;
use ntpl_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `note_templates` table, with its visible role ids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NoteTemplate {
    pub id: DbId,
    pub project_id: DbId,
    pub tracker_id: DbId,
    pub author_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub memo: String,
    pub enabled: bool,
    pub visibility: String,
    pub position: Position,
    pub role_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NoteTemplate {
    /// Parsed visibility. The table's CHECK constraint keeps the fallback
    /// unreachable; an unknown value is treated as the most restrictive one.
    pub fn visibility(&self) -> Visibility {
        self.visibility.parse().unwrap_or(Visibility::Mine)
    }
}

impl Positioned for NoteTemplate {
    fn position(&self) -> Position {
        self.position
    }
}

impl FilterCandidate for NoteTemplate {
    fn template_ref(&self) -> TemplateRef<'_> {
        TemplateRef {
            id: self.id,
            project_id: self.project_id,
            tracker_id: self.tracker_id,
            author_id: self.author_id,
            visibility: self.visibility(),
            role_ids: &self.role_ids,
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// DTO for creating a new note template. The project comes from the route.
///
/// `tracker_id` is optional here so a missing value is reported as a field
/// validation error rather than a body parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNoteTemplate {
    pub tracker_id: Option<DbId>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub memo: String,
    pub enabled: Option<bool>,
    pub visibility: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<DbId>,
}

/// DTO for updating a note template. All fields are optional.
///
/// Changing `tracker_id` moves the template to the end of the new group.
/// `position` is applied after any tracker move.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteTemplate {
    pub tracker_id: Option<DbId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub memo: Option<String>,
    pub enabled: Option<bool>,
    pub visibility: Option<String>,
    pub role_ids: Option<Vec<DbId>>,
    pub position: Option<Position>,
}

/// Request body for `PUT /note-templates/{id}/position`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositionNoteTemplate {
    pub position: Position,
}

/// Query parameters for template listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteTemplateListParams {
    pub tracker_id: Option<DbId>,
}

/// Request body for `POST /note-templates/load`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadNoteTemplateRequest {
    pub note_template_id: DbId,
}

/// The fields a UI needs to prefill a note from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteTemplateLoad {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub project_id: DbId,
    pub tracker_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub memo: String,
}

impl From<NoteTemplate> for NoteTemplateLoad {
    fn from(t: NoteTemplate) -> Self {
        Self {
            id: t.id,
            project_id: t.project_id,
            tracker_id: t.tracker_id,
            name: t.name,
            description: t.description,
            memo: t.memo,
        }
    }
}
