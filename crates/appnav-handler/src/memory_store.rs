//! In-process app-state store
//!
//! Keys are ULIDs. States become visible to [`AppStateStore::get_state`]
//! only after [`AppState::save`]. Useful for tests and the CLI.

use crate::error::ServiceError;
use crate::services::{AppState, AppStateStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use ulid::Ulid;

type Saved = Arc<RwLock<HashMap<(String, String), Value>>>;

/// App-state store backed by a shared map
#[derive(Debug, Clone, Default)]
pub struct InMemoryAppStateStore {
    saved: Saved,
}

impl InMemoryAppStateStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved states
    #[must_use]
    pub fn len(&self) -> usize {
        self.saved.read().len()
    }

    /// No state saved yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.read().is_empty()
    }

    /// Saved payload of a key
    #[must_use]
    pub fn saved_data(&self, owner: &str, key: &str) -> Option<Value> {
        self.saved
            .read()
            .get(&(owner.to_string(), key.to_string()))
            .cloned()
    }

    /// Drop a saved state, simulating expiry
    pub fn expire(&self, owner: &str, key: &str) {
        self.saved
            .write()
            .remove(&(owner.to_string(), key.to_string()));
    }
}

#[async_trait]
impl AppStateStore for InMemoryAppStateStore {
    fn create_empty_state(&self, owner: &str) -> Box<dyn AppState> {
        Box::new(MemoryState {
            owner: owner.to_string(),
            key: Ulid::new().to_string(),
            data: Value::Null,
            saved: Arc::clone(&self.saved),
        })
    }

    async fn get_state(
        &self,
        owner: &str,
        key: &str,
    ) -> Result<Option<Box<dyn AppState>>, ServiceError> {
        let data = self.saved_data(owner, key);
        Ok(data.map(|data| {
            Box::new(MemoryState {
                owner: owner.to_string(),
                key: key.to_string(),
                data,
                saved: Arc::clone(&self.saved),
            }) as Box<dyn AppState>
        }))
    }
}

struct MemoryState {
    owner: String,
    key: String,
    data: Value,
    saved: Saved,
}

#[async_trait]
impl AppState for MemoryState {
    fn key(&self) -> String {
        self.key.clone()
    }

    fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    fn data(&self) -> Value {
        self.data.clone()
    }

    async fn save(&self) -> Result<(), ServiceError> {
        self.saved
            .write()
            .insert((self.owner.clone(), self.key.clone()), self.data.clone());
        Ok(())
    }
}
