mod common;

use common::{test_item, TestApp};
use rust_decimal_macros::dec;
use storelink_api::errors::ServiceError;
use storelink_api::models::{
    Cart, Customer, InvoiceStatus, OrderMode, OrderStatus,
};
use storelink_api::services::OrderBuilder;

fn walk_in() -> Customer {
    Customer::new("Walk-in", "")
}

#[test]
fn total_is_sum_of_quantity_times_price() {
    let catalog = vec![
        test_item("Amazer", dec!(100), 5),
        test_item("ZVTV", dec!(250.50), 9),
    ];
    let cart: Cart = [(catalog[0].id.clone(), 3u32), (catalog[1].id.clone(), 2u32)]
        .into_iter()
        .collect();

    let draft = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Offline, "Main")
        .expect("draft should build");

    assert_eq!(draft.order.total_amount, dec!(300) + dec!(501.00));
    assert_eq!(draft.lines.len(), 2);
}

#[test]
fn concrete_scenario_single_line() {
    let mut item = test_item("Amazer 4G", dec!(100), 5);
    item.id = "a".to_string();
    let catalog = vec![item.clone()];
    let cart: Cart = [("a", 3u32)].into_iter().collect();

    let draft = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Offline, "Main")
        .expect("draft should build");

    assert_eq!(draft.order.total_amount, dec!(300));
    let line = &draft.lines[0];
    assert_eq!(line.model, item.model);
    assert_eq!(line.order_qty, 3);
    assert_eq!(line.display_price, dec!(100));
    assert_eq!(line.final_price, dec!(100));
    assert_eq!(line.fulfill_qty, 0);
    assert_eq!(line.id, format!("{}-0", draft.order.id));
}

#[test]
fn fresh_order_has_expected_initial_state() {
    let catalog = vec![test_item("Alnac", dec!(4100), 3)];
    let cart: Cart = [(catalog[0].id.clone(), 1u32)].into_iter().collect();

    let draft = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Online, "Depot")
        .unwrap();

    assert_eq!(draft.order.status, OrderStatus::Fresh);
    assert_eq!(draft.order.invoice_status, InvoiceStatus::Pending);
    assert_eq!(draft.order.order_mode, OrderMode::Online);
    assert_eq!(draft.order.warehouse, "Depot");
    assert!(draft.order.cargo_name.is_none());
}

#[test]
fn empty_cart_is_rejected() {
    let catalog = vec![test_item("Amazer", dec!(100), 5)];
    let result = OrderBuilder::build(
        &walk_in(),
        &Cart::new(),
        &catalog,
        OrderMode::Offline,
        "Main",
    );
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[test]
fn unknown_items_are_dropped_and_skip_line_indices() {
    let catalog = vec![test_item("Amazer", dec!(100), 5)];
    let cart: Cart = [
        ("ghost".to_string(), 4u32),
        (catalog[0].id.clone(), 2u32),
    ]
    .into_iter()
    .collect();

    let draft = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Offline, "Main")
        .unwrap();

    assert_eq!(draft.lines.len(), 1);
    assert_eq!(draft.order.total_amount, dec!(200));
    // Retained lines are indexed contiguously.
    assert_eq!(draft.lines[0].id, format!("{}-0", draft.order.id));
}

#[test]
fn cart_of_only_unknown_items_is_rejected() {
    let catalog = vec![test_item("Amazer", dec!(100), 5)];
    let cart: Cart = [("ghost", 4u32)].into_iter().collect();
    let result = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Offline, "Main");
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[test]
fn nameless_customer_is_rejected() {
    let catalog = vec![test_item("Amazer", dec!(100), 5)];
    let cart: Cart = [(catalog[0].id.clone(), 1u32)].into_iter().collect();
    let nameless = Customer::new("  ", "");
    let result = OrderBuilder::build(&nameless, &cart, &catalog, OrderMode::Offline, "Main");
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn created_order_and_lines_are_readable_back() {
    let app = TestApp::new();
    let item = app
        .state
        .catalog
        .add_item(test_item("Persisted", dec!(75), 10))
        .await
        .unwrap();

    let cart: Cart = [(item.id.clone(), 4u32)].into_iter().collect();
    let catalog = app.state.catalog.list_active().await.unwrap();
    let draft = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Offline, "Main")
        .unwrap();
    let order_id = draft.order.id.clone();

    let created = app.state.orders.create_order(draft).await.unwrap();
    assert_eq!(created.total_amount, dec!(300));

    let fetched = app.state.orders.get_order(&order_id).await.unwrap();
    assert_eq!(fetched, created);

    let lines = app.state.orders.lines_for_order(&order_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].order_qty, 4);
    assert_eq!(lines[0].display_price, dec!(75));
}

#[tokio::test]
async fn order_creation_succeeds_when_event_channel_is_closed() {
    let app = TestApp::with_closed_events();
    let item = app
        .state
        .catalog
        .add_item(test_item("Unlistened", dec!(50), 10))
        .await
        .unwrap();

    let cart: Cart = [(item.id.clone(), 2u32)].into_iter().collect();
    let catalog = app.state.catalog.list_active().await.unwrap();
    let draft = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Offline, "Main")
        .unwrap();
    let order_id = draft.order.id.clone();

    let created = app
        .state
        .orders
        .create_order(draft)
        .await
        .expect("persisted order must not be reported as failed");
    assert_eq!(created.total_amount, dec!(100));
    assert_eq!(
        app.state.orders.lines_for_order(&order_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn duplicate_order_id_conflicts() {
    let app = TestApp::new();
    let item = app
        .state
        .catalog
        .add_item(test_item("Conflicting", dec!(10), 5))
        .await
        .unwrap();

    let cart: Cart = [(item.id.clone(), 1u32)].into_iter().collect();
    let catalog = app.state.catalog.list_active().await.unwrap();
    let draft = OrderBuilder::build(&walk_in(), &cart, &catalog, OrderMode::Offline, "Main")
        .unwrap();

    app.state.orders.create_order(draft.clone()).await.unwrap();
    let second = app.state.orders.create_order(draft).await;
    assert!(matches!(second, Err(ServiceError::Conflict(_))));
}
