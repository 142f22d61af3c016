//! Order models for cart-less direct ordering.
//!
//! A direct order is one menu item at some quantity; the backend stores it as
//! an order with a single line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::MenuItem;

#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Menu item {0} is not linked to a restaurant")]
    MissingRestaurant(String),

    #[error("Menu item {0} is currently unavailable")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cod,
}

impl PaymentMethod {
    pub fn from_str(s: Option<&str>) -> Self {
        match s.map(|m| m.trim().to_ascii_lowercase()) {
            Some(m) if m == "cod" || m == "cash" => PaymentMethod::Cod,
            _ => PaymentMethod::Card,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::Cod => "Cash on Delivery",
        }
    }
}

/// Order lifecycle as the restaurant screens move it along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    OutForDelivery,
    Delivered,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    /// Parse a status string. The backend is inconsistent about case
    /// ("Pending" vs "pending").
    pub fn from_str(s: Option<&str>) -> Self {
        match s.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("pending") => OrderStatus::Pending,
            Some("out for delivery") => OrderStatus::OutForDelivery,
            Some("delivered") => OrderStatus::Delivered,
            Some("cancelled") | Some("canceled") => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Unknown => "Unknown",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::OutForDelivery)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: String,
    pub items: Vec<OrderLine>,
    #[serde(rename = "totalPrice")]
    pub total_price: f64,
    pub status: String,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    /// Build a single-item order for `quantity` units of `item`.
    pub fn direct(
        user_id: Option<String>,
        item: &MenuItem,
        quantity: u32,
        payment_method: PaymentMethod,
    ) -> Result<Self, OrderError> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity);
        }
        if item.status_kind() == super::MenuItemStatus::Unavailable {
            return Err(OrderError::Unavailable(item.name.clone()));
        }
        let restaurant_id = item
            .restaurant_id
            .clone()
            .ok_or_else(|| OrderError::MissingRestaurant(item.id.clone()))?;

        Ok(Self {
            user_id,
            restaurant_id,
            items: vec![OrderLine {
                name: item.name.clone(),
                quantity,
                price: item.price,
            }],
            total_price: item.price * f64::from(quantity),
            status: OrderStatus::Pending.as_str().to_string(),
            payment_method,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    /// Either an id string or a populated user document.
    #[serde(rename = "userId", default)]
    pub user_id: Option<Value>,
    #[serde(rename = "restaurantId", default)]
    pub restaurant_id: Option<Value>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(rename = "totalPrice", default)]
    pub total_price: f64,
    pub status: Option<String>,
    #[serde(rename = "paymentMethod")]
    pub payment_method: Option<String>,
    pub rating: Option<u8>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn status_kind(&self) -> OrderStatus {
        OrderStatus::from_str(self.status.as_deref())
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    pub fn summary(&self) -> String {
        let names: Vec<String> = self
            .items
            .iter()
            .map(|line| format!("{} x {}", line.quantity, line.name))
            .collect();
        format!("{} (${:.2}) [{}]", names.join(", "), self.total_price, self.status_kind().as_str())
    }
}

/// Partial order update: restaurants move the status, users leave a rating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl OrderUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
            rating: None,
        }
    }

    pub fn rating(rating: u8) -> Self {
        Self {
            status: None,
            rating: Some(rating.clamp(1, 5)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}
