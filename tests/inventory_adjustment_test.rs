mod common;

use common::{test_item, TestApp};
use rust_decimal_macros::dec;
use storelink_api::config::AppConfig;
use storelink_api::errors::ServiceError;
use storelink_api::models::{ItemStatus, StockChange};
use storelink_api::services::CreateLinkRequest;

#[tokio::test]
async fn positive_delta_adds_stock_and_logs_once() {
    let app = TestApp::new();
    let item = app
        .state
        .catalog
        .add_item(test_item("Stocked", dec!(100), 5))
        .await
        .unwrap();

    let adjustment = app
        .state
        .catalog
        .adjust_quantity(&item.id, 7, "intake", "Main shop")
        .await
        .unwrap();

    assert_eq!(adjustment.previous_quantity, 5);
    assert_eq!(adjustment.new_quantity, 12);
    let entry = adjustment.entry.expect("effective adjustment must log");
    assert_eq!(entry.status, StockChange::Added);
    assert_eq!(entry.quantity_change, 7);
    assert_eq!(entry.current_stock, 12);
    assert_eq!(entry.model_name, item.model);
    assert_eq!(entry.shop_name, "Main shop");

    let logged: Vec<_> = app
        .state
        .catalog
        .log_entries()
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.model_name == item.model)
        .collect();
    assert_eq!(logged.len(), 1);

    let stored = app.state.catalog.get_item(&item.id).await.unwrap();
    assert_eq!(stored.quantity, 12);
}

#[tokio::test]
async fn negative_delta_clamps_at_zero() {
    let app = TestApp::new();
    let item = app
        .state
        .catalog
        .add_item(test_item("Clamped", dec!(100), 3))
        .await
        .unwrap();

    let adjustment = app
        .state
        .catalog
        .adjust_quantity(&item.id, -10, "shrinkage", "Main shop")
        .await
        .unwrap();

    assert_eq!(adjustment.new_quantity, 0);
    let entry = adjustment.entry.unwrap();
    assert_eq!(entry.status, StockChange::Removed);
    // Only the applied change is logged, not the requested ten.
    assert_eq!(entry.quantity_change, 3);
    assert_eq!(entry.current_stock, 0);
}

#[tokio::test]
async fn noop_adjustments_log_nothing() {
    let app = TestApp::new();
    let item = app
        .state
        .catalog
        .add_item(test_item("Untouched", dec!(100), 0))
        .await
        .unwrap();

    let zero = app
        .state
        .catalog
        .adjust_quantity(&item.id, 0, "", "Main shop")
        .await
        .unwrap();
    assert!(zero.entry.is_none());

    let at_floor = app
        .state
        .catalog
        .adjust_quantity(&item.id, -5, "", "Main shop")
        .await
        .unwrap();
    assert!(at_floor.entry.is_none());
    assert_eq!(at_floor.new_quantity, 0);

    let logged: Vec<_> = app
        .state
        .catalog
        .log_entries()
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.model_name == item.model)
        .collect();
    assert!(logged.is_empty());
}

#[tokio::test]
async fn adjustment_succeeds_and_logs_once_when_event_channel_is_closed() {
    let app = TestApp::with_closed_events();
    let item = app
        .state
        .catalog
        .add_item(test_item("Unlistened", dec!(100), 5))
        .await
        .unwrap();

    let adjustment = app
        .state
        .catalog
        .adjust_quantity(&item.id, 3, "intake", "Main shop")
        .await
        .expect("durable mutation must not fail on a lost event");

    assert_eq!(adjustment.new_quantity, 8);
    assert_eq!(app.state.catalog.get_item(&item.id).await.unwrap().quantity, 8);

    let logged: Vec<_> = app
        .state
        .catalog
        .log_entries()
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.model_name == item.model)
        .collect();
    assert_eq!(logged.len(), 1);
}

#[tokio::test]
async fn adjusting_an_unknown_item_is_not_found() {
    let app = TestApp::new();
    let result = app
        .state
        .catalog
        .adjust_quantity("missing", 5, "", "Main shop")
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn deactivation_is_soft_and_hides_from_active_list() {
    let app = TestApp::new();
    let item = app
        .state
        .catalog
        .add_item(test_item("Retiring", dec!(100), 2))
        .await
        .unwrap();

    app.state.catalog.deactivate_item(&item.id).await.unwrap();

    let stored = app.state.catalog.get_item(&item.id).await.unwrap();
    assert_eq!(stored.status, ItemStatus::Inactive);
    assert!(app
        .state
        .catalog
        .list_active()
        .await
        .unwrap()
        .iter()
        .all(|i| i.id != item.id));
}

#[tokio::test]
async fn deactivation_prunes_allow_lists_when_enforced() {
    let mut config = AppConfig::default();
    config.links.enforce_allowlist_integrity = true;
    let app = TestApp::with_config(config);

    let item = app
        .state
        .catalog
        .add_item(test_item("Pruned", dec!(100), 2))
        .await
        .unwrap();
    let link = app
        .state
        .links
        .create(CreateLinkRequest {
            title: "Dealer portal".into(),
            warehouse: "Main".into(),
        })
        .await
        .unwrap();
    app.state
        .links
        .add_to_allow_list(&link.id, &[item.id.clone()])
        .await
        .unwrap();

    app.state.catalog.deactivate_item(&item.id).await.unwrap();

    let after = app.state.links.get(&link.id).await.unwrap();
    assert!(!after.allowed_models.contains(&item.id));
}

#[tokio::test]
async fn deactivation_tolerates_dangling_references_by_default() {
    let app = TestApp::new();

    let item = app
        .state
        .catalog
        .add_item(test_item("Dangling", dec!(100), 2))
        .await
        .unwrap();
    let link = app
        .state
        .links
        .create(CreateLinkRequest {
            title: "Dealer portal".into(),
            warehouse: "Main".into(),
        })
        .await
        .unwrap();
    app.state
        .links
        .add_to_allow_list(&link.id, &[item.id.clone()])
        .await
        .unwrap();

    app.state.catalog.deactivate_item(&item.id).await.unwrap();

    // The reference stays, but the inactive item no longer renders on
    // either side of the visibility split.
    let after = app.state.links.get(&link.id).await.unwrap();
    assert!(after.allowed_models.contains(&item.id));
    let split = app.state.links.visibility(&link.id, "Dangling").await.unwrap();
    assert!(split.portal.is_empty());
    assert!(split.master.is_empty());
}

#[tokio::test]
async fn search_matches_model_and_brand_case_insensitively() {
    let app = TestApp::new();
    app.state
        .catalog
        .add_item(test_item("Searchable XR", dec!(100), 1))
        .await
        .unwrap();

    let by_model = app.state.catalog.search("searchable").await.unwrap();
    assert_eq!(by_model.len(), 1);

    let by_brand = app.state.catalog.search("testbrand").await.unwrap();
    assert!(!by_brand.is_empty());

    let none = app.state.catalog.search("no-such-model").await.unwrap();
    assert!(none.is_empty());
}
