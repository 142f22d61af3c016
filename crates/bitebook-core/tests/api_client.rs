//! ApiClient requests and response handling against a mock backend.

use std::sync::Arc;

use bitebook_core::api::{ApiClient, ApiError};
use bitebook_core::auth::{Credential, CredentialStore, MemoryStore};
use bitebook_core::models::{MenuItemStatus, NewMenuItem, NewOrder, OrderStatus, OrderUpdate, PaymentMethod, Role};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_with_token(token: Option<&str>) -> (MockServer, ApiClient, Arc<MemoryStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    if let Some(token) = token {
        store.set(&Credential::new(token, Role::User)).unwrap();
    }
    let client = ApiClient::new(format!("{}/", server.uri()), store.clone()).unwrap();
    (server, client, store)
}

#[tokio::test]
async fn test_fetch_menu_and_place_direct_order() {
    let (server, client, _) = client_with_token(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/api/menu-items/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "menuItem": {"_id": "m1", "name": "Pho", "price": 9.5, "restaurantId": "r1", "status": "available"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("Authorization", "Bearer tok"))
        .and(body_json(json!({
            "userId": "u1",
            "restaurantId": "r1",
            "items": [{"name": "Pho", "quantity": 2, "price": 9.5}],
            "totalPrice": 19.0,
            "status": "Pending",
            "paymentMethod": "cod"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "order": {"_id": "o1", "items": [{"name": "Pho", "quantity": 2, "price": 9.5}], "totalPrice": 19.0, "status": "Pending"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = client.fetch_menu_item("m1").await.unwrap();
    let order = NewOrder::direct(Some("u1".to_string()), &item, 2, PaymentMethod::Cod).unwrap();
    let created = client.create_order(&order).await.unwrap().unwrap();

    assert_eq!(created.id, "o1");
    assert_eq!(created.item_count(), 2);
    assert_eq!(created.status_kind(), OrderStatus::Pending);
}

#[tokio::test]
async fn test_restaurant_menu_and_status_change() {
    let (server, client, _) = client_with_token(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/api/menu-items/restaurant/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "menuItems": [
                {"_id": "m1", "name": "Pho", "price": 9.5},
                {"_id": "m2", "name": "Banh Mi", "price": 6, "status": "unavailable"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/menu-items/m2"))
        .and(body_json(json!({"status": "available"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let items = client.fetch_menu_items(Some("r1")).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].status_kind(), MenuItemStatus::Unavailable);

    client
        .set_menu_item_status("m2", MenuItemStatus::Available)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_order_update_sends_only_set_fields() {
    let (server, client, _) = client_with_token(Some("tok")).await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/o1"))
        .and(body_json(json!({"status": "Out for Delivery"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_order("o1", &OrderUpdate::status(OrderStatus::OutForDelivery))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_admin_approval_queue() {
    let (server, client, _) = client_with_token(Some("admin-tok")).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/restaurants/pending"))
        .and(header("Authorization", "Bearer admin-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "restaurants": [{"_id": "r9", "name": "Taco Town", "email": "t@x.com"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/restaurants/r9/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Approved"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/restaurants/r10/reject"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Restaurant not found"})))
        .mount(&server)
        .await;

    let pending = client.fetch_pending_restaurants().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].name, "Taco Town");

    client.approve_restaurant("r9").await.unwrap();

    match client.reject_restaurant("r10").await {
        Err(ApiError::NotFound(message)) => assert_eq!(message, "Restaurant not found"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_requests_without_credential_carry_no_auth_header() {
    let (server, client, _) = client_with_token(None).await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    client.health().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_token_change_is_picked_up_per_request() {
    let (server, client, store) = client_with_token(Some("first")).await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(header("Authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orders": []})))
        .expect(1)
        .mount(&server)
        .await;

    store.set(&Credential::new("second", Role::User)).unwrap();
    assert!(client.fetch_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_mapping() {
    let (server, client, _) = client_with_token(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.fetch_orders().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.backend_provided(), Some("jwt expired"));

    let err = client.fetch_order("bad").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = ApiClient::new("http://127.0.0.1:9", Arc::new(MemoryStore::new())).unwrap();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ApiError::NetworkError(_)));
}

#[tokio::test]
async fn test_health_accepts_plain_text_reply() {
    let (server, client, _) = client_with_token(None).await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    client.health().await.unwrap();
}

#[tokio::test]
async fn test_menu_item_create_and_delete() {
    let (server, client, _) = client_with_token(Some("rest-tok")).await;
    Mock::given(method("POST"))
        .and(path("/api/menu-items"))
        .and(header("Authorization", "Bearer rest-tok"))
        .and(body_json(json!({"name": "Spring Rolls", "price": 5.5, "category": "Starters"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "menuItem": {"_id": "m7", "name": "Spring Rolls", "price": 5.5, "category": "Starters", "restaurantId": "r1"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/menu-items/m7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Deleted"))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_menu_item(&NewMenuItem {
            name: "Spring Rolls".to_string(),
            description: None,
            price: 5.5,
            category: "Starters".to_string(),
            image_url: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "m7");
    assert_eq!(created.restaurant_id.as_deref(), Some("r1"));

    client.delete_menu_item("m7").await.unwrap();
}

#[tokio::test]
async fn test_delete_order_with_empty_reply() {
    let (server, client, _) = client_with_token(Some("tok")).await;
    Mock::given(method("DELETE"))
        .and(path("/api/orders/o3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/orders/o4"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Not your order"})))
        .mount(&server)
        .await;

    client.delete_order("o3").await.unwrap();
    match client.delete_order("o4").await {
        Err(ApiError::AccessDenied(message)) => assert_eq!(message, "Not your order"),
        other => panic!("unexpected result: {other:?}"),
    }
}
