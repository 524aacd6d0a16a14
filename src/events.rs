//! In-process domain events.
//!
//! Services emit an event after each successful mutation; delivery is
//! fire-and-forget over a bounded mpsc channel. The default consumer just
//! logs. Nothing here is a delivery guarantee.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::models::StockChange;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: String,
        customer_name: String,
        total_amount: Decimal,
        line_count: usize,
    },
    InventoryAdjusted {
        item_id: String,
        change: StockChange,
        quantity_change: u32,
        current_stock: u32,
    },
    ItemDeactivated {
        item_id: String,
    },
    LinkCreated {
        link_id: String,
        code: String,
    },
    LinkStatusChanged {
        link_id: String,
        enabled: bool,
    },
    BroadcastSent {
        recipient_count: usize,
        message: String,
        sent_at: DateTime<Utc>,
    },
}

#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates an event channel pair with the given buffer capacity.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Spawns the default consumer: drain the channel and log each event.
pub fn spawn_logger(mut receiver: mpsc::Receiver<Event>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            info!(?event, "domain event");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (sender, receiver) = channel(4);
        drop(receiver);
        let result = sender
            .send(Event::ItemDeactivated {
                item_id: "a".into(),
            })
            .await;
        assert!(result.is_err());
    }
}
