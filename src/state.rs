use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::SqliteTaskStore;
use crate::services::TaskService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tasks: Arc<TaskService>,
    pub api_key: Arc<str>,
}

impl AppState {
    /// Wires the SQLite store into the task operations.
    pub fn new(db: SqlitePool, api_key: &str) -> Self {
        let store = Arc::new(SqliteTaskStore::new(db.clone()));
        Self {
            db,
            tasks: Arc::new(TaskService::new(store)),
            api_key: Arc::from(api_key),
        }
    }
}
