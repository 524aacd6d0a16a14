use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Record;

/// Lifecycle status of a catalog item. Items are never hard-deleted;
/// retiring one flips it to `Inactive`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ItemStatus {
    Active,
    Inactive,
}

/// A sellable inventory record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier, immutable once created.
    pub id: String,
    pub brand: String,
    pub quality: String,
    pub model: String,
    pub category: String,
    /// Current list price. Order lines snapshot this at build time.
    pub price: Decimal,
    /// On-hand stock, never negative.
    pub quantity: u32,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

impl CatalogItem {
    /// New active item with zero stock, as inventory intake creates them.
    pub fn new(
        brand: impl Into<String>,
        quality: impl Into<String>,
        model: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            brand: brand.into(),
            quality: quality.into(),
            model: model.into(),
            category: category.into(),
            price,
            quantity: 0,
            status: ItemStatus::Active,
            instance_id: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != ItemStatus::Inactive
    }

    /// Case-insensitive substring match over model and brand. An empty
    /// term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.model.to_lowercase().contains(&term) || self.brand.to_lowercase().contains(&term)
    }
}

impl Record for CatalogItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}

/// Applies a signed delta to a stock level, clamping into `0..=u32::MAX`.
/// Underflow is absorbed, never an error.
pub fn clamped_quantity(previous: u32, delta: i64) -> u32 {
    i64::from(previous)
        .saturating_add(delta)
        .clamp(0, i64::from(u32::MAX)) as u32
}

/// Direction of a manual stock adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum StockChange {
    Added,
    Removed,
}

/// One line of the append-only inventory audit trail.
///
/// Created exactly once per effective manual adjustment; never mutated or
/// deleted afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryLogEntry {
    pub id: String,
    pub model_name: String,
    pub created_date: DateTime<Utc>,
    pub status: StockChange,
    /// Magnitude of the applied change, always positive.
    pub quantity_change: u32,
    /// The item's quantity immediately after this adjustment.
    pub current_stock: u32,
    pub remarks: String,
    pub shop_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

impl Record for InventoryLogEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}
