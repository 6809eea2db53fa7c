//! Shared server state.

use std::path::Path;
use std::sync::Arc;

use typetrace_core::config::CollectorConfig;
use typetrace_core::errors::StorageError;
use typetrace_storage::Database;

use crate::query::QueryEngine;

/// State shared by every handler: the store and the query engine over it.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub engine: Arc<QueryEngine>,
}

impl AppState {
    /// Open (or create) the database configured in `config`.
    pub fn new(config: &CollectorConfig) -> Result<Self, StorageError> {
        let db = Arc::new(Database::open(Path::new(&config.database_path))?);
        Ok(Self::from_database(db, config))
    }

    /// In-memory state for tests.
    pub fn in_memory() -> Result<Self, StorageError> {
        let db = Arc::new(Database::open_in_memory()?);
        Ok(Self::from_database(db, &CollectorConfig::default()))
    }

    fn from_database(db: Arc<Database>, config: &CollectorConfig) -> Self {
        let engine = Arc::new(QueryEngine::new(db.clone(), config));
        Self { db, engine }
    }
}
