use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{CatalogItem, InventoryLogEntry, ItemStatus, StockChange, StorefrontLink};
use crate::store::collections::keys;
use crate::store::{seed, Collection, KeyValueStore};

/// Outcome of a manual stock adjustment.
///
/// `entry` is `None` when the request was a no-op (zero delta, or a
/// negative delta against already-empty stock): nothing changed, so
/// nothing is logged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryAdjustment {
    pub item_id: String,
    pub previous_quantity: u32,
    pub new_quantity: u32,
    pub entry: Option<InventoryLogEntry>,
}

/// Source of truth for catalog items and the append-only inventory audit
/// trail.
#[derive(Clone)]
pub struct CatalogService {
    items: Collection<CatalogItem>,
    logs: Collection<InventoryLogEntry>,
    links: Collection<StorefrontLink>,
    event_sender: EventSender,
    enforce_allowlist_integrity: bool,
    instance_id: Option<String>,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let instance_id = config.instance_id.clone();
        Self {
            items: Collection::new(
                store.clone(),
                keys::INVENTORY,
                instance_id.clone(),
                seed::catalog_seed,
            ),
            logs: Collection::unseeded(store.clone(), keys::INVENTORY_LOGS, instance_id.clone()),
            links: Collection::unseeded(store, keys::LINKS, instance_id.clone()),
            event_sender,
            enforce_allowlist_integrity: config.links.enforce_allowlist_integrity,
            instance_id,
        }
    }

    pub async fn list(&self) -> Result<Vec<CatalogItem>, ServiceError> {
        self.items.fetch_all().await
    }

    /// All items a customer or ordering surface may see.
    pub async fn list_active(&self) -> Result<Vec<CatalogItem>, ServiceError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(CatalogItem::is_active)
            .collect())
    }

    pub async fn get_item(&self, item_id: &str) -> Result<CatalogItem, ServiceError> {
        self.items
            .get(item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("catalog item", item_id))
    }

    /// Case-insensitive substring search over model and brand.
    pub async fn search(&self, term: &str) -> Result<Vec<CatalogItem>, ServiceError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|item| item.matches(term))
            .collect())
    }

    /// Inventory intake: registers a new item.
    #[instrument(skip(self, item), fields(item_id = %item.id, model = %item.model))]
    pub async fn add_item(&self, mut item: CatalogItem) -> Result<CatalogItem, ServiceError> {
        if item.instance_id.is_none() {
            item.instance_id = self.instance_id.clone();
        }
        self.items.insert(item.clone()).await?;
        info!("catalog item added");
        Ok(item)
    }

    /// Replace-by-id update. The id itself never changes.
    pub async fn update_item(&self, item: CatalogItem) -> Result<CatalogItem, ServiceError> {
        self.items.replace(item.clone()).await?;
        Ok(item)
    }

    /// Soft delete: items are never removed, only flipped to `Inactive`.
    ///
    /// When allow-list integrity enforcement is configured, the id is also
    /// pruned from every storefront link; otherwise stale references are
    /// tolerated and filtered out at render time.
    #[instrument(skip(self))]
    pub async fn deactivate_item(&self, item_id: &str) -> Result<CatalogItem, ServiceError> {
        let mut item = self.get_item(item_id).await?;
        if item.status != ItemStatus::Inactive {
            item.status = ItemStatus::Inactive;
            self.items.replace(item.clone()).await?;
        }

        if self.enforce_allowlist_integrity {
            self.prune_from_allow_lists(item_id).await?;
        }

        // The mutation is already durable; a lost event is log-worthy,
        // not a failure.
        if let Err(e) = self
            .event_sender
            .send(Event::ItemDeactivated {
                item_id: item_id.to_string(),
            })
            .await
        {
            warn!(error = %e, "failed to publish item deactivation event");
        }
        Ok(item)
    }

    async fn prune_from_allow_lists(&self, item_id: &str) -> Result<(), ServiceError> {
        for mut link in self.links.fetch_all().await? {
            if link.allowed_models.remove(item_id) {
                warn!(link_id = %link.id, item_id, "pruning deactivated item from allow-list");
                self.links.replace(link).await?;
            }
        }
        Ok(())
    }

    /// Applies a manual stock adjustment and records it in the audit log.
    ///
    /// The resulting quantity is clamped at zero rather than erroring on
    /// underflow. An effective adjustment appends exactly one log entry
    /// whose `current_stock` equals the item's post-adjustment quantity.
    #[instrument(skip(self, remarks, shop_name))]
    pub async fn adjust_quantity(
        &self,
        item_id: &str,
        delta: i64,
        remarks: &str,
        shop_name: &str,
    ) -> Result<InventoryAdjustment, ServiceError> {
        let mut item = self.get_item(item_id).await?;

        let previous = item.quantity;
        let clamped = crate::models::catalog::clamped_quantity(previous, delta);
        let applied = i64::from(clamped) - i64::from(previous);

        if applied == 0 {
            return Ok(InventoryAdjustment {
                item_id: item.id,
                previous_quantity: previous,
                new_quantity: previous,
                entry: None,
            });
        }

        item.quantity = clamped;
        self.items.replace(item.clone()).await?;

        let change = if applied > 0 {
            StockChange::Added
        } else {
            StockChange::Removed
        };
        let entry = InventoryLogEntry {
            id: Uuid::new_v4().to_string(),
            model_name: item.model.clone(),
            created_date: Utc::now(),
            status: change,
            quantity_change: applied.unsigned_abs() as u32,
            current_stock: item.quantity,
            remarks: remarks.to_string(),
            shop_name: shop_name.to_string(),
            instance_id: item.instance_id.clone(),
        };
        self.logs.insert(entry.clone()).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::InventoryAdjusted {
                item_id: item.id.clone(),
                change,
                quantity_change: entry.quantity_change,
                current_stock: entry.current_stock,
            })
            .await
        {
            warn!(error = %e, "failed to publish inventory adjustment event");
        }

        info!(
            previous,
            current = item.quantity,
            "inventory adjusted"
        );
        Ok(InventoryAdjustment {
            item_id: item.id,
            previous_quantity: previous,
            new_quantity: item.quantity,
            entry: Some(entry),
        })
    }

    /// The audit trail, oldest first.
    pub async fn log_entries(&self) -> Result<Vec<InventoryLogEntry>, ServiceError> {
        self.logs.fetch_all().await
    }
}
