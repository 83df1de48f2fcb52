use crate::config::AppConfig;
use crate::storage::MemoryStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One store per process. Handlers hold the lock for a whole
/// read-compute-write cycle, so requests never interleave.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<Mutex<MemoryStore>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: MemoryStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
        }
    }
}
