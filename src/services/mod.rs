//! Domain services. Each holds its collection handles and the event
//! sender; all state is injected at construction, never ambient.

pub mod broadcast;
pub mod catalog;
pub mod links;
pub mod orders;

pub use broadcast::{BroadcastAudience, BroadcastDispatcher, BroadcastReceipt, BroadcastRequest};
pub use catalog::{CatalogService, InventoryAdjustment};
pub use links::{partition_catalog, CatalogPartition, CreateLinkRequest, LinkService};
pub use orders::{DraftOrder, OrderBuilder, OrderService};
