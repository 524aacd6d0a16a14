use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    Cart, CatalogItem, Customer, InvoiceStatus, Order, OrderLine, OrderMode, OrderStatus,
};
use crate::store::collections::keys;
use crate::store::{Collection, KeyValueStore};

/// An order and its lines, built but not yet persisted.
#[derive(Clone, Debug)]
pub struct DraftOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Pure construction of an order from a cart and a catalog snapshot.
///
/// Prices are snapshotted from the catalog at build time; the caller is
/// responsible for persistence.
pub struct OrderBuilder;

impl OrderBuilder {
    /// Builds a draft order.
    ///
    /// Cart entries referencing ids absent from the snapshot are dropped
    /// with a warning; line indices count only retained lines. An empty
    /// cart, or one that retains no known items, is a validation error
    /// rather than a zero-total order.
    pub fn build(
        customer: &Customer,
        cart: &Cart,
        catalog: &[CatalogItem],
        order_mode: OrderMode,
        warehouse: &str,
    ) -> Result<DraftOrder, ServiceError> {
        if customer.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "customer name is required".into(),
            ));
        }
        if cart.total_quantity() == 0 {
            return Err(ServiceError::ValidationError("cart is empty".into()));
        }

        let order_id = Uuid::new_v4().to_string();
        let mut lines = Vec::with_capacity(cart.len());
        let mut total_amount = Decimal::ZERO;

        for entry in cart.entries() {
            let Some(item) = catalog.iter().find(|i| i.id == entry.item_id) else {
                warn!(
                    item_id = %entry.item_id,
                    quantity = entry.quantity,
                    "dropping cart entry: item not in catalog snapshot"
                );
                continue;
            };
            let line_total = item.price * Decimal::from(entry.quantity);
            total_amount += line_total;
            lines.push(OrderLine {
                id: OrderLine::line_id(&order_id, lines.len()),
                order_id: order_id.clone(),
                brand: item.brand.clone(),
                quality: item.quality.clone(),
                category: item.category.clone(),
                model: item.model.clone(),
                order_qty: entry.quantity,
                display_price: item.price,
                fulfill_qty: 0,
                final_price: item.price,
            });
        }

        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "cart references no known catalog items".into(),
            ));
        }

        let order = Order {
            id: order_id,
            customer_name: customer.name.clone(),
            customer_subtext: customer.subtext.clone(),
            order_time: Utc::now(),
            warehouse: warehouse.to_string(),
            status: OrderStatus::Fresh,
            invoice_status: InvoiceStatus::Pending,
            order_mode,
            cargo_name: None,
            total_amount,
            instance_id: None,
        };

        Ok(DraftOrder { order, lines })
    }
}

/// Persists built orders and reads them back.
#[derive(Clone)]
pub struct OrderService {
    orders: Collection<Order>,
    lines: Collection<OrderLine>,
    event_sender: EventSender,
    instance_id: Option<String>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let instance_id = config.instance_id.clone();
        Self {
            orders: Collection::unseeded(store.clone(), keys::ORDERS, instance_id.clone()),
            lines: Collection::unseeded(store, keys::ORDER_LINES, instance_id.clone()),
            event_sender,
            instance_id,
        }
    }

    /// Persists a draft: one write for the order, one per line collection.
    ///
    /// There is no multi-collection transaction; if the line write fails
    /// after the order write succeeded the two collections diverge until
    /// repaired manually. That window is inherent to the store contract.
    #[instrument(skip(self, draft), fields(order_id = %draft.order.id))]
    pub async fn create_order(&self, draft: DraftOrder) -> Result<Order, ServiceError> {
        let DraftOrder { mut order, lines } = draft;
        if order.instance_id.is_none() {
            order.instance_id = self.instance_id.clone();
        }

        self.orders.insert(order.clone()).await?;
        for line in &lines {
            self.lines.insert(line.clone()).await?;
        }

        // Order and lines are durable at this point; a closed event
        // channel must not turn the creation into a failure.
        if let Err(e) = self
            .event_sender
            .send(Event::OrderCreated {
                order_id: order.id.clone(),
                customer_name: order.customer_name.clone(),
                total_amount: order.total_amount,
                line_count: lines.len(),
            })
            .await
        {
            warn!(error = %e, "failed to publish order creation event");
        }

        info!(total = %order.total_amount, lines = lines.len(), "order created");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, ServiceError> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", order_id))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, ServiceError> {
        self.orders.fetch_all().await
    }

    /// Lines belonging to one order, in line-index order.
    pub async fn lines_for_order(&self, order_id: &str) -> Result<Vec<OrderLine>, ServiceError> {
        Ok(self
            .lines
            .fetch_all()
            .await?
            .into_iter()
            .filter(|line| line.order_id == order_id)
            .collect())
    }
}
