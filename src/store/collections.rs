//! Typed access to the per-collection JSON arrays.
//!
//! Each logical collection lives under a fixed key and holds an array of
//! records with a unique `id` field. Writes are whole-array replacements:
//! read, mutate, write back. There is no batch or transactional write
//! across collections; callers that touch several collections issue
//! independent writes and accept the divergence window that implies.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ServiceError;
use crate::store::{KeyValueStore, StoreError};

/// Reserved collection keys.
///
/// The full layout is declared here even where the owning surface is out
/// of scope for this crate, so nothing else squats on a reserved key.
pub mod keys {
    pub const USERS: &str = "users";
    pub const ORDERS: &str = "orders";
    pub const ORDER_LINES: &str = "order_lines";
    pub const CUSTOMERS: &str = "customers";
    pub const FIRMS: &str = "firms";
    pub const INVENTORY: &str = "inventory";
    pub const INVENTORY_LOGS: &str = "inventory_logs";
    pub const LINKS: &str = "links";
    pub const GROUPS: &str = "groups";
    pub const GR_INVENTORY: &str = "gr_inventory";
    pub const ROLE_PERMISSIONS: &str = "role_permissions";

    const MASTER_RECORDS_PREFIX: &str = "master_records_";

    /// Key for a typed master-record collection, e.g. `master_records_brand`.
    pub fn master_records(kind: &str) -> String {
        format!("{}{}", MASTER_RECORDS_PREFIX, kind)
    }

    /// Collections exempt from the per-tenant partition filter.
    pub fn partition_exempt(key: &str) -> bool {
        key == ROLE_PERMISSIONS || key.starts_with(MASTER_RECORDS_PREFIX)
    }
}

/// A persisted record: unique string id plus an optional tenant tag.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn id(&self) -> &str;

    /// Tenant partition tag. Untagged records are visible to every tenant.
    fn instance_id(&self) -> Option<&str> {
        None
    }
}

/// Handle to one collection: a fixed key, an optional tenant partition,
/// and a built-in seed used for first-run bootstrap.
#[derive(Clone)]
pub struct Collection<T: Record> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    instance_id: Option<String>,
    seed: fn() -> Vec<T>,
}

impl<T: Record> Collection<T> {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        instance_id: Option<String>,
        seed: fn() -> Vec<T>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            instance_id,
            seed,
        }
    }

    /// Collection with no seed data.
    pub fn unseeded(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        instance_id: Option<String>,
    ) -> Self {
        Self::new(store, key, instance_id, Vec::new)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the full stored array, seeding the collection on first read.
    ///
    /// The seed is written back so subsequent reads hit the stored copy,
    /// not the built-in fallback.
    async fn load_raw(&self) -> Result<Vec<T>, ServiceError> {
        let stored = self.store.get(&self.key).await?;
        let records: Vec<T> = match stored {
            Some(value) => serde_json::from_value(value).map_err(|err| {
                StoreError::Corrupt {
                    key: self.key.clone(),
                    detail: err.to_string(),
                }
            })?,
            None => Vec::new(),
        };

        if records.is_empty() {
            let seeded = (self.seed)();
            if !seeded.is_empty() {
                self.save_raw(&seeded).await?;
            }
            return Ok(seeded);
        }
        Ok(records)
    }

    async fn save_raw(&self, records: &[T]) -> Result<(), ServiceError> {
        let value = serde_json::to_value(records).map_err(StoreError::from)?;
        self.store.set(&self.key, value).await?;
        Ok(())
    }

    fn visible(&self, record: &T) -> bool {
        if keys::partition_exempt(&self.key) {
            return true;
        }
        match (&self.instance_id, record.instance_id()) {
            (Some(tenant), Some(tag)) => tenant == tag,
            // Untagged records and unpartitioned handles see everything.
            _ => true,
        }
    }

    /// All records visible to this handle's tenant partition.
    pub async fn fetch_all(&self) -> Result<Vec<T>, ServiceError> {
        let records = self.load_raw().await?;
        Ok(records.into_iter().filter(|r| self.visible(r)).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, ServiceError> {
        Ok(self.fetch_all().await?.into_iter().find(|r| r.id() == id))
    }

    /// Insert-if-absent by id.
    pub async fn insert(&self, record: T) -> Result<(), ServiceError> {
        let mut records = self.load_raw().await?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(ServiceError::Conflict(format!(
                "record {} already exists in '{}'",
                record.id(),
                self.key
            )));
        }
        records.push(record);
        self.save_raw(&records).await
    }

    /// Replace-by-id.
    pub async fn replace(&self, record: T) -> Result<(), ServiceError> {
        let mut records = self.load_raw().await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| ServiceError::not_found(&self.key, record.id()))?;
        *slot = record;
        self.save_raw(&records).await
    }

    /// Delete-by-id.
    pub async fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let mut records = self.load_raw().await?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(ServiceError::not_found(&self.key, id));
        }
        self.save_raw(&records).await
    }
}
