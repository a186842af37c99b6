use std::sync::Arc;

use crate::storage::{StorageConfig, TeamStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TeamStore>,
}

impl AppState {
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            store: Arc::new(TeamStore::new(storage)),
        }
    }
}
