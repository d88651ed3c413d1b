use ntpl_core::types::DbId;

use super::{NoteTemplateStore, StoreResult};
use crate::models::note_template::NoteTemplateLoad;

/// Loads a template's content fields for prefilling a note.
///
/// No visibility check happens here: callers must only pass ids they took
/// from a visibility-filtered listing, or authorize the request themselves.
#[derive(Clone)]
pub struct TemplateLookup {
    store: NoteTemplateStore,
}

impl TemplateLookup {
    pub fn new(store: NoteTemplateStore) -> Self {
        Self { store }
    }

    /// Fails with `NotFound` for ids that were never created or were deleted.
    pub async fn load(&self, id: DbId) -> StoreResult<NoteTemplateLoad> {
        let template = self.store.get(id).await?;
        tracing::debug!(note_template_id = id, "Note template loaded");
        Ok(NoteTemplateLoad::from(template))
    }
}
