use std::sync::Arc;

use rust_decimal::Decimal;
use storelink_api::config::AppConfig;
use storelink_api::events;
use storelink_api::models::CatalogItem;
use storelink_api::store::InMemoryStore;
use storelink_api::AppState;

/// Test harness: fresh in-memory store, default config, drained event
/// channel.
pub struct TestApp {
    pub state: AppState,
    _event_drain: Option<tokio::task::JoinHandle<()>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let (sender, receiver) = events::channel(config.event_buffer);
        let drain = events::spawn_logger(receiver);
        let state = AppState::new(Arc::new(InMemoryStore::new()), config, sender);
        Self {
            state,
            _event_drain: Some(drain),
        }
    }

    /// Harness whose event receiver is already gone, for exercising the
    /// fire-and-forget side of the event channel.
    #[allow(dead_code)]
    pub fn with_closed_events() -> Self {
        let config = AppConfig::default();
        let (sender, receiver) = events::channel(config.event_buffer);
        drop(receiver);
        let state = AppState::new(Arc::new(InMemoryStore::new()), config, sender);
        Self {
            state,
            _event_drain: None,
        }
    }
}

/// Active catalog item with the given stock. Model names are prefixed so
/// tests can search for their own items without meeting the seed data.
#[allow(dead_code)]
pub fn test_item(model: &str, price: Decimal, quantity: u32) -> CatalogItem {
    let mut item = CatalogItem::new("TestBrand", "Premium", model, "Tyre", price);
    item.quantity = quantity;
    item
}
