//! Authentication module for managing sessions and credentials.
//!
//! This module provides:
//! - `SessionManager`: identity + credential owner for one role context
//! - `RouteGuard`: checking / unauthenticated / role-mismatch / authorized
//! - `CredentialStore`: injected token storage (memory, file, OS keyring)
//!
//! An authorization failure anywhere clears the credential; a redirect to the
//! role's login page only happens when the user is on a protected path.

pub mod credentials;
pub mod error;
pub mod guard;
pub mod session;

pub use credentials::{stored_role, Credential, CredentialStore, FileStore, KeyringStore, MemoryStore};
pub use error::SessionError;
pub use guard::{login_redirect, GuardDecision, RouteGuard};
pub use session::{SessionManager, SessionState};
