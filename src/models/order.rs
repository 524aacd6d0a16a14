use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Fulfillment status of an order. Orders are created `Fresh`; the
/// fulfillment workflow that advances them lives outside this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Fresh,
    Processing,
    Fulfilled,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum InvoiceStatus {
    Pending,
    Issued,
    Paid,
}

/// How the order reached the system: placed by staff in the back office
/// or self-served through a storefront link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum OrderMode {
    Offline,
    Online,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_subtext: String,
    pub order_time: DateTime<Utc>,
    pub warehouse: String,
    pub status: OrderStatus,
    pub invoice_status: InvoiceStatus,
    pub order_mode: OrderMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_name: Option<String>,
    /// Sum of `order_qty * display_price` over the order's lines at
    /// creation time. Frozen thereafter.
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

impl Record for Order {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}

/// One line of an order. Created together with its order, same lifetime.
///
/// `display_price` and `final_price` are snapshots of the catalog price at
/// build time and do not track later price changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// `{order_id}-{index}`, index being the line's position in the cart.
    pub id: String,
    pub order_id: String,
    pub brand: String,
    pub quality: String,
    pub category: String,
    pub model: String,
    pub order_qty: u32,
    pub display_price: Decimal,
    /// Quantity shipped so far; starts at 0, advanced by fulfillment.
    pub fulfill_qty: u32,
    pub final_price: Decimal,
}

impl OrderLine {
    pub fn line_id(order_id: &str, index: usize) -> String {
        format!("{}-{}", order_id, index)
    }
}

impl Record for OrderLine {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A transient, insertion-ordered mapping from catalog item id to desired
/// quantity. Held only in memory until an order is built from it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartEntry {
    pub item_id: String,
    pub quantity: u32,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the desired quantity for an item. A quantity of zero removes
    /// the entry; an existing entry keeps its position when updated.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            self.entries.retain(|e| e.item_id != item_id);
            return;
        }
        match self.entries.iter_mut().find(|e| e.item_id == item_id) {
            Some(entry) => entry.quantity = quantity,
            None => self.entries.push(CartEntry {
                item_id: item_id.to_string(),
                quantity,
            }),
        }
    }

    pub fn remove(&mut self, item_id: &str) {
        self.set_quantity(item_id, 0);
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.item_id == item_id)
            .map(|e| e.quantity)
            .unwrap_or(0)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Cart {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut cart = Cart::new();
        for (id, qty) in iter {
            cart.set_quantity(&id.into(), qty);
        }
        cart
    }
}
