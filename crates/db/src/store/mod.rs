//! Transactional template store and the lookup service built on it.

mod lookup;
mod note_template_store;

pub use lookup::TemplateLookup;
pub use note_template_store::NoteTemplateStore;

use ntpl_core::error::CoreError;

/// Error returned by store operations: a domain error or a database failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
