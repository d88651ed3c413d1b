use std::sync::Arc;

use ntpl_db::store::{NoteTemplateStore, TemplateLookup};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ntpl_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Note template store, carrying the permission oracle.
    pub store: NoteTemplateStore,
    /// Template content lookup for prefilling notes.
    pub lookup: TemplateLookup,
}

impl AppState {
    /// State wired to the Postgres-backed oracle and registry.
    pub fn new(pool: ntpl_db::DbPool, config: ServerConfig) -> Self {
        let store = NoteTemplateStore::postgres(pool.clone());
        Self::with_store(pool, config, store)
    }

    /// State around an explicitly built store, e.g. one with a stub oracle.
    pub fn with_store(
        pool: ntpl_db::DbPool,
        config: ServerConfig,
        store: NoteTemplateStore,
    ) -> Self {
        let lookup = TemplateLookup::new(store.clone());
        Self {
            pool,
            config: Arc::new(config),
            store,
            lookup,
        }
    }
}
