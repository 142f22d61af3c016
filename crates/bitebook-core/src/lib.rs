//! Client library for a multi-role food-ordering backend.
//!
//! The core is the session manager in [`auth`]: it owns the persisted bearer
//! credential for one role context (`user`, `restaurant` or `admin`), keeps
//! the current identity, and decides when an authorization failure should
//! send the user back to the login page. [`api`] wraps the REST endpoints.
//! Presentation stays outside the crate behind the [`notify::Notifier`] and
//! [`nav::Navigator`] traits.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nav;
pub mod notify;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, GuardDecision, RouteGuard, SessionError, SessionManager, SessionState};
pub use config::Config;
pub use models::{Identity, Role};
