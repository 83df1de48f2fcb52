use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error};

/// Key names of the persisted documents.
pub mod keys {
    pub const DRIVERS: &str = "fastwayAllData";
    pub const RACE_STATE: &str = "fastway_race_state_v2";
    pub const PLAYOFF_DATA: &str = "fastway_playoff_data";
    pub const PLAYOFF_STATE: &str = "fastway_playoff_state";
    pub const CHAMPIONSHIP_HISTORY: &str = "fastway_championship_history";

    pub fn award_history(award_id: &str) -> String {
        format!("fastway_award_history_{award_id}")
    }
}

/// Synchronous, string-keyed, whole-value store.
///
/// There are no partial updates: callers read a document, change it, and
/// write the whole thing back.
pub trait RecordStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

pub async fn load_store(path: &Path) -> MemoryStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<MemoryStore>(&bytes) {
            Ok(store) => {
                debug!(keys = store.len(), "loaded record store");
                store
            }
            Err(err) => {
                error!("failed to parse store file: {err}");
                MemoryStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => MemoryStore::default(),
        Err(err) => {
            error!("failed to read store file: {err}");
            MemoryStore::default()
        }
    }
}

pub async fn persist_store(path: &Path, store: &MemoryStore) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(store)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_the_whole_value() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(keys::DRIVERS), None);

        store.set(keys::DRIVERS, "[1]".to_string());
        store.set(keys::DRIVERS, "[2]".to_string());

        assert_eq!(store.get(keys::DRIVERS).as_deref(), Some("[2]"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn award_history_keys_are_per_award() {
        assert_eq!(keys::award_history("mostWins"), "fastway_award_history_mostWins");
    }

    #[tokio::test]
    async fn store_file_round_trips_and_tolerates_garbage() {
        let mut path = std::env::temp_dir();
        path.push(format!("fastway_store_{}.json", std::process::id()));

        let mut store = MemoryStore::new();
        store.set(keys::PLAYOFF_STATE, "{\"active\":true}".to_string());
        persist_store(&path, &store).await.unwrap();
        assert_eq!(load_store(&path).await, store);

        fs::write(&path, b"{\"truncated\":").await.unwrap();
        assert!(load_store(&path).await.is_empty());

        let _ = fs::remove_file(&path).await;
    }
}
