//! Persisted record types.
//!
//! Every entity the store holds has an explicit typed shape here; records
//! that fail to deserialize are rejected at the store boundary rather than
//! duck-typed at the point of use.

pub mod catalog;
pub mod customer;
pub mod link;
pub mod order;

pub use catalog::{CatalogItem, InventoryLogEntry, ItemStatus, StockChange};
pub use customer::{BroadcastGroup, Customer};
pub use link::{LinkStatus, StorefrontLink};
pub use order::{Cart, CartEntry, InvoiceStatus, Order, OrderLine, OrderMode, OrderStatus};
