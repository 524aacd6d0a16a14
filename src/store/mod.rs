//! Key-value persistence boundary.
//!
//! Every collection in the system is stored as a JSON array under a fixed
//! string key. The store contract is deliberately small: get, set, delete,
//! no transactions, a single logical writer. Backends only need to move
//! opaque JSON blobs; all typing happens in [`collections`].

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;

pub mod collections;
pub mod seed;

pub use collections::{Collection, Record};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record under key '{key}': {detail}")]
    Corrupt { key: String, detail: String },
}

/// The persistence contract: string key to JSON blob.
///
/// Mirrors the browser-local blob store the application was designed
/// around. A stalled backend is the backend's problem; no timeout or
/// retry policy is imposed here.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend, the default for tests and single-process use.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held. Test hook.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
