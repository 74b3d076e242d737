//! Integration tests for the derived operations: routes, methods, payload
//! shapes and mapping of the returned envelopes.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use pantry_client::{CartAddition, OrderFilter, SalesPeriod};
use pantry_core::models::{CartItem, Category, DashboardStats, Item, Order, User};
use pantry_core::{
    AddonId, CartItemId, CategoryId, FlavorId, ItemId, OrderId, OrderStatus, UserId, VendorId,
};
use pantry_integration_tests::{Harness, MockResponse};
use reqwest::Method;
use serde_json::{Value, json};

// =============================================================================
// Resource CRUD
// =============================================================================

#[tokio::test]
async fn test_upsert_with_and_without_id_hits_same_endpoint() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::POST,
        "/categories/save",
        MockResponse::envelope(json!({"id": 4, "name": "Drinks"})),
    );

    let create = Category {
        name: "Drinks".to_string(),
        ..Category::default()
    };
    let update = Category {
        id: Some(CategoryId::new(4)),
        ..create.clone()
    };

    h.client.save_category(&create).await.unwrap();
    h.client.save_category(&update).await.unwrap();

    let requests = h.backend.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/categories/save");
    }
    assert!(requests[0].json().get("id").is_none());
    assert_eq!(requests[1].json()["id"], 4);
    assert_eq!(requests[1].json()["name"], "Drinks");
}

#[tokio::test]
async fn test_resource_routes() {
    let h = Harness::start().await.unwrap();
    let routes = [
        (Method::GET, "/users/3"),
        (Method::DELETE, "/vendors/8"),
        (Method::GET, "/items/5"),
        (Method::DELETE, "/addons/6"),
        (Method::GET, "/flavors/2"),
        (Method::GET, "/items/category/4"),
        (Method::GET, "/items/vendor/8"),
    ];
    for (method, path) in &routes {
        h.respond(method.clone(), path, MockResponse::envelope(Value::Null));
    }

    h.client.get_user(UserId::new(3)).await.unwrap();
    h.client.delete_vendor(VendorId::new(8)).await.unwrap();
    h.client.get_item(ItemId::new(5)).await.unwrap();
    h.client.delete_addon(AddonId::new(6)).await.unwrap();
    h.client.get_flavor(FlavorId::new(2)).await.unwrap();
    h.client.items_by_category(CategoryId::new(4)).await.unwrap();
    h.client.items_by_vendor(VendorId::new(8)).await.unwrap();

    let seen: Vec<(Method, String)> = h
        .backend
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let expected: Vec<(Method, String)> = routes
        .iter()
        .map(|(m, p)| (m.clone(), format!("/api{p}")))
        .collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_list_maps_rows() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::GET,
        "/items",
        MockResponse::envelope(json!([
            {"id": 1, "name": "Latte", "price": "4.50", "categoryId": 2},
            {"id": "2", "name": "Mocha", "price": 5, "discountPrice": "4.25"}
        ])),
    );

    let envelope = h.client.list_items().await.unwrap();
    let items: Vec<Item> = envelope.list_as().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category_id, Some(CategoryId::new(2)));
    assert_eq!(items[1].id, Some(ItemId::new(2)));
    assert_eq!(items[1].effective_price().to_string(), "4.25");
}

#[tokio::test]
async fn test_item_read_and_saved_back_keeps_numeric_price() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::GET,
        "/items/3",
        MockResponse::envelope(json!({"id": 3, "name": "Latte", "price": 6.5})),
    );
    h.respond(Method::POST, "/items/save", MockResponse::envelope(json!({"id": 3})));

    let item: Item = h.client.get_item(ItemId::new(3)).await.unwrap().data_as().unwrap();
    h.client.save_item(&item).await.unwrap();

    let body = h.last_request().unwrap().json();
    assert_eq!(body["id"], 3);
    assert_eq!(body["price"], json!(6.5));
}

#[tokio::test]
async fn test_vendor_save_carries_password() {
    let h = Harness::start().await.unwrap();
    h.respond(Method::POST, "/vendors/save", MockResponse::envelope(json!({"id": 12})));

    let vendor = User {
        email: "shop@pantry.test".to_string(),
        name: "Corner Shop".to_string(),
        store_name: Some("Corner".to_string()),
        password: Some("initial".to_string()),
        ..User::default()
    };
    let envelope = h.client.save_vendor(&vendor).await.unwrap();

    let body = h.last_request().unwrap().json();
    assert_eq!(body["storeName"], "Corner");
    assert_eq!(body["password"], "initial");
    assert!(body.get("id").is_none());
    assert_eq!(envelope.data.unwrap()["id"], 12);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_round_trips() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::GET,
        "/cart",
        MockResponse::envelope(json!([
            {"id": 10, "itemId": 1, "name": "Latte", "quantity": 2, "unitPrice": "4.50"}
        ])),
    );
    h.respond(Method::POST, "/cart/add", MockResponse::envelope(Value::Null));
    h.respond(Method::PUT, "/cart/update", MockResponse::envelope(Value::Null));
    h.respond(Method::DELETE, "/cart/remove/10", MockResponse::envelope(Value::Null));
    h.respond(Method::DELETE, "/cart/clear", MockResponse::envelope(Value::Null));

    let cart: Vec<CartItem> = h.client.get_cart().await.unwrap().list_as().unwrap();
    assert_eq!(pantry_core::models::cart::cart_total(&cart).to_string(), "9.00");

    let addition = CartAddition::new(ItemId::new(1), 2)
        .with_addons([AddonId::new(3)])
        .with_flavor(FlavorId::new(5));
    h.client.add_to_cart(&addition).await.unwrap();
    h.client
        .update_cart_quantity(CartItemId::new(10), 3)
        .await
        .unwrap();
    h.client.remove_from_cart(CartItemId::new(10)).await.unwrap();
    h.client.clear_cart().await.unwrap();

    let requests = h.backend.requests();
    assert_eq!(requests.len(), 5);
    assert_eq!(
        requests[1].json(),
        json!({"itemId": 1, "quantity": 2, "addonIds": [3], "flavorId": 5})
    );
    assert_eq!(requests[2].method, Method::PUT);
    assert_eq!(requests[2].json(), json!({"cartItemId": 10, "quantity": 3}));
    assert_eq!(requests[3].path, "/api/cart/remove/10");
    assert_eq!(requests[4].path, "/api/cart/clear");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_list_orders_sends_only_set_filters() {
    let h = Harness::start().await.unwrap();
    h.respond(Method::GET, "/orders", MockResponse::envelope(json!([])));

    h.client.list_orders(&OrderFilter::default()).await.unwrap();
    let filter = OrderFilter::default()
        .between(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .status(OrderStatus::Delivered);
    h.client.list_orders(&filter).await.unwrap();

    let requests = h.backend.requests();
    assert_eq!(requests[0].query, None);
    assert_eq!(
        requests[1].query.as_deref(),
        Some("startDate=2026-01-01&endDate=2026-01-31&status=delivered")
    );
}

#[tokio::test]
async fn test_vendor_orders_with_paging() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::GET,
        "/orders/vendor/8",
        MockResponse::envelope(json!({"rows": [
            {"id": 100, "status": "Out for delivery", "totalAmount": "18.00"}
        ], "total": 1})),
    );

    let envelope = h
        .client
        .vendor_orders(VendorId::new(8), &OrderFilter::default().page(1, 20))
        .await
        .unwrap();

    assert_eq!(h.last_request().unwrap().query.as_deref(), Some("page=1&limit=20"));
    let orders: Vec<Order> = envelope.list_as().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::OutForDelivery);
}

#[tokio::test]
async fn test_order_create_get_and_status() {
    let h = Harness::start().await.unwrap();
    h.respond(Method::POST, "/orders", MockResponse::envelope(json!({"id": 55})));
    h.respond(
        Method::GET,
        "/orders/55",
        MockResponse::envelope(json!({"id": 55, "status": "pending", "totalAmount": 12})),
    );
    h.respond(Method::PUT, "/orders/55/status", MockResponse::envelope(Value::Null));

    h.client
        .create_order(&json!({"items": [{"itemId": 1, "quantity": 1}], "paymentMethod": "cash"}))
        .await
        .unwrap();
    let order: Order = h
        .client
        .get_order(OrderId::new(55))
        .await
        .unwrap()
        .data_as()
        .unwrap();
    h.client
        .update_order_status(order.id.unwrap(), OrderStatus::Accepted)
        .await
        .unwrap();

    let requests = h.backend.requests();
    assert_eq!(requests[0].json()["paymentMethod"], "cash");
    assert_eq!(requests[2].method, Method::PUT);
    assert_eq!(requests[2].json(), json!({"status": "accepted"}));
}

#[tokio::test]
async fn test_unknown_status_is_rejected_locally() {
    let h = Harness::start().await.unwrap();

    let err = h
        .client
        .update_order_status(OrderId::new(1), OrderStatus::Unknown)
        .await
        .unwrap_err();

    assert!(matches!(err, pantry_client::ApiError::InvalidRequest(_)));
    assert!(h.backend.requests().is_empty());
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_queries() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::GET,
        "/dashboard/stats",
        MockResponse::envelope(json!({"totalOrders": 40, "totalRevenue": "812.50"})),
    );
    h.respond(Method::GET, "/dashboard/sales", MockResponse::envelope(json!([])));
    h.respond(Method::GET, "/dashboard/top-items", MockResponse::envelope(json!([])));
    h.respond(Method::GET, "/dashboard/recent-orders", MockResponse::envelope(json!([])));

    let stats: DashboardStats = h.client.dashboard_stats().await.unwrap().data_as().unwrap();
    h.client.sales_report(SalesPeriod::Monthly).await.unwrap();
    h.client.top_items(5).await.unwrap();
    h.client.recent_orders(10).await.unwrap();

    assert_eq!(stats.total_orders, 40);
    assert_eq!(stats.total_revenue.to_string(), "812.50");

    let queries: Vec<Option<String>> = h
        .backend
        .requests()
        .into_iter()
        .map(|r| r.query)
        .collect();
    assert_eq!(
        queries,
        vec![
            None,
            Some("period=monthly".to_string()),
            Some("limit=5".to_string()),
            Some("limit=10".to_string()),
        ]
    );
}
