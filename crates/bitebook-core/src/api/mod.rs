//! REST API client module for the food-ordering backend.
//!
//! This module provides the `ApiClient` for the auth, menu, order and admin
//! endpoints, the per-role endpoint table, and the `ApiError` taxonomy.
//!
//! The API uses bearer token authentication; the token comes from the
//! credential store written by the session manager.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::ApiClient;
pub use endpoints::{FormEncoding, FormEndpoint, RoleEndpoints};
pub use error::{ApiError, ApiResult};
