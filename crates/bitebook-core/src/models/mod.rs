//! Data models for the food-ordering backend.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Role`: the three role contexts (`user`, `restaurant`, `admin`)
//! - `Identity`: the normalized current-session record
//! - Form payloads: login, registration and profile updates
//! - `MenuItem`, `Order`: menu browsing and direct ordering
//! - `PendingRestaurant`: admin approval queue entries

pub mod forms;
pub mod identity;
pub mod menu;
pub mod order;
pub mod restaurant;
pub mod role;

pub use forms::{
    AdminRegistration, Attachment, FormPayload, LoginRequest, ProfileUpdate,
    RestaurantRegistration, UserRegistration,
};
pub use identity::Identity;
pub use menu::{MenuItem, MenuItemResponse, MenuItemsResponse, MenuItemStatus, NewMenuItem};
pub use order::{NewOrder, Order, OrderError, OrderLine, OrderStatus, OrderUpdate, OrdersResponse, PaymentMethod};
pub use restaurant::{PendingRestaurant, PendingRestaurantsResponse};
pub use role::{Role, UnknownRole};
