//! API client for the food-ordering REST backend.
//!
//! This module provides the `ApiClient` struct for making requests to the
//! auth, menu, order and admin endpoints. The bearer token is read from the
//! injected credential store and attached in exactly one place
//! ([`ApiClient::authorize`]), so individual calls never deal with it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::endpoints::{self, FormEncoding, FormEndpoint, RoleEndpoints};
use super::error::{ApiError, ApiResult};
use crate::auth::CredentialStore;
use crate::models::{
    FormPayload, LoginRequest, MenuItem, MenuItemResponse, MenuItemStatus, MenuItemsResponse,
    NewMenuItem, NewOrder, Order, OrderUpdate, OrdersResponse, PendingRestaurant,
    PendingRestaurantsResponse,
};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a new API client reading its bearer token from `credentials`
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Create a new ApiClient against another store, sharing the connection pool.
    pub fn with_credentials(&self, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        let token = match self.credentials.get() {
            Ok(credential) => credential.map(|c| c.token),
            Err(e) => {
                warn!(error = %e, "Failed to read credential, sending request unauthenticated");
                None
            }
        };
        if let Some(token) = token {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value"),
            }
        }
        headers
    }

    /// The single outgoing-request hook: every request passes through here.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.headers(self.auth_headers())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn execute(&self, method: Method, path: &str, builder: impl FnOnce(RequestBuilder) -> RequestBuilder) -> ApiResult<Response> {
        debug!(%method, path, "Sending request");
        let request = builder(self.authorize(self.client.request(method, self.url(path))));
        let response = request.send().await?;
        Self::check_response(response).await
    }

    /// Read a JSON body; an empty body reads as `null`.
    async fn read_json<T: DeserializeOwned>(response: Response, path: &str) -> ApiResult<T> {
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(Method::GET, path, |b| b).await?;
        Self::read_json(response, path).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> ApiResult<T> {
        let response = self.execute(method, path, |b| b.json(body)).await?;
        Self::read_json(response, path).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> ApiResult<Value> {
        let response = self.execute(method, path, |b| b).await?;
        Self::read_json(response, path).await
    }

    /// Send a request whose success body is never read. Plain-text replies
    /// ("OK", "Logged out") are fine here.
    async fn send_discard(&self, method: Method, path: &str) -> ApiResult<()> {
        self.execute(method, path, |b| b).await?;
        Ok(())
    }

    async fn send_form(&self, method: Method, endpoint: FormEndpoint, payload: &FormPayload) -> ApiResult<Value> {
        match endpoint.encoding {
            FormEncoding::Json => self.send_json(method, endpoint.path, &payload.json_body()).await,
            FormEncoding::Multipart => {
                let form = payload.to_multipart()?;
                let response = self.execute(method, endpoint.path, |b| b.multipart(form)).await?;
                Self::read_json(response, endpoint.path).await
            }
        }
    }

    // ===== Auth =====

    pub async fn register(&self, routes: &RoleEndpoints, payload: &FormPayload) -> ApiResult<Value> {
        self.send_form(Method::POST, routes.register, payload).await
    }

    /// Returns the raw login body (`{token, <identity>}`).
    pub async fn login(&self, routes: &RoleEndpoints, request: &LoginRequest) -> ApiResult<Value> {
        self.send_json(Method::POST, routes.login, request).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        self.send_discard(Method::POST, endpoints::LOGOUT).await
    }

    pub async fn profile(&self, routes: &RoleEndpoints) -> ApiResult<Value> {
        self.get(routes.profile).await
    }

    pub async fn update_profile(&self, endpoint: FormEndpoint, payload: &FormPayload) -> ApiResult<Value> {
        self.send_form(Method::PUT, endpoint, payload).await
    }

    pub async fn toggle_status(&self, path: &str) -> ApiResult<Value> {
        self.send_empty(Method::PATCH, path).await
    }

    /// Liveness probe
    pub async fn health(&self) -> ApiResult<()> {
        self.send_discard(Method::GET, endpoints::HEALTH).await
    }

    // ===== Menu =====

    /// Fetch the public menu, or one restaurant's menu
    pub async fn fetch_menu_items(&self, restaurant_id: Option<&str>) -> ApiResult<Vec<MenuItem>> {
        let path = match restaurant_id {
            Some(id) => endpoints::menu_items_for_restaurant(id),
            None => endpoints::MENU_ITEMS.to_string(),
        };
        let resp: MenuItemsResponse = self.get(&path).await?;
        Ok(resp.menu_items)
    }

    pub async fn fetch_menu_item(&self, id: &str) -> ApiResult<MenuItem> {
        let resp: MenuItemResponse = self.get(&endpoints::menu_item(id)).await?;
        Ok(resp.menu_item)
    }

    /// Create a menu item; the backend answers `{menuItem}` or the bare item.
    pub async fn create_menu_item(&self, item: &NewMenuItem) -> ApiResult<MenuItem> {
        let body: Value = self.send_json(Method::POST, endpoints::MENU_ITEMS, item).await?;
        nested_or_flat(&body, "menuItem")
            .ok_or_else(|| ApiError::InvalidResponse("Menu item missing from create response".to_string()))
    }

    pub async fn set_menu_item_status(&self, id: &str, status: MenuItemStatus) -> ApiResult<()> {
        let body = serde_json::json!({ "status": status.as_str() });
        self.execute(Method::PUT, &endpoints::menu_item(id), |b| b.json(&body)).await?;
        Ok(())
    }

    pub async fn delete_menu_item(&self, id: &str) -> ApiResult<()> {
        self.send_discard(Method::DELETE, &endpoints::menu_item(id)).await
    }

    // ===== Orders =====

    /// Place an order. The created order is returned when the backend echoes it.
    pub async fn create_order(&self, order: &NewOrder) -> ApiResult<Option<Order>> {
        let body: Value = self.send_json(Method::POST, endpoints::ORDERS, order).await?;
        Ok(nested_or_flat(&body, "order"))
    }

    /// Orders visible to the current credential (own orders, or the
    /// restaurant's incoming orders)
    pub async fn fetch_orders(&self) -> ApiResult<Vec<Order>> {
        let resp: OrdersResponse = self.get(endpoints::ORDERS).await?;
        Ok(resp.orders)
    }

    pub async fn fetch_order(&self, id: &str) -> ApiResult<Order> {
        let body: Value = self.get(&endpoints::order(id)).await?;
        nested_or_flat(&body, "order")
            .ok_or_else(|| ApiError::InvalidResponse(format!("Order {} missing from response", id)))
    }

    pub async fn update_order(&self, id: &str, update: &OrderUpdate) -> ApiResult<()> {
        self.execute(Method::PUT, &endpoints::order(id), |b| b.json(update)).await?;
        Ok(())
    }

    pub async fn delete_order(&self, id: &str) -> ApiResult<()> {
        self.send_discard(Method::DELETE, &endpoints::order(id)).await
    }

    // ===== Admin =====

    pub async fn fetch_pending_restaurants(&self) -> ApiResult<Vec<PendingRestaurant>> {
        let resp: PendingRestaurantsResponse = self.get(endpoints::PENDING_RESTAURANTS).await?;
        Ok(resp.restaurants)
    }

    pub async fn approve_restaurant(&self, id: &str) -> ApiResult<()> {
        self.send_discard(Method::PUT, &endpoints::approve_restaurant(id)).await
    }

    pub async fn reject_restaurant(&self, id: &str) -> ApiResult<()> {
        self.send_discard(Method::PUT, &endpoints::reject_restaurant(id)).await
    }
}

/// Deserialize `body[key]` when present, otherwise `body` itself.
fn nested_or_flat<T: DeserializeOwned>(body: &Value, key: &str) -> Option<T> {
    let candidate = body.get(key).filter(|v| v.is_object()).unwrap_or(body);
    serde_json::from_value(candidate.clone()).ok()
}
