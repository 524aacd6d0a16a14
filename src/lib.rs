//! Storelink core library
//!
//! Back-office core for a small distribution/reseller business: order
//! construction from catalog snapshots, inventory records with an
//! append-only audit log, shareable storefront links with per-link
//! allow-lists, and a fire-and-forget broadcast stub. All persistence
//! goes through the [`store::KeyValueStore`] contract.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::{BroadcastDispatcher, CatalogService, LinkService, OrderService};
use crate::store::KeyValueStore;

/// Application state: one explicitly constructed bundle of services over
/// a shared store handle, created once at startup and passed down.
/// Nothing in this crate reaches for an ambient singleton.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub links: LinkService,
    pub broadcast: BroadcastDispatcher,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        config: AppConfig,
        event_sender: EventSender,
    ) -> Self {
        let catalog = CatalogService::new(store.clone(), event_sender.clone(), &config);
        let orders = OrderService::new(store.clone(), event_sender.clone(), &config);
        let links = LinkService::new(store.clone(), event_sender.clone(), &config);
        let broadcast = BroadcastDispatcher::new(store.clone(), event_sender.clone(), &config);
        Self {
            store,
            config,
            event_sender,
            catalog,
            orders,
            links,
            broadcast,
        }
    }
}
