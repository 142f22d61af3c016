//! Session manager: the single source of truth for "who is logged in as
//! role R".
//!
//! The manager owns the persisted credential for its role context and the
//! cached identity. Everything else reads state through [`SessionManager::state`]
//! or a [`watch::Receiver`] and changes it only by calling the operations
//! here.
//!
//! Error propagation is uneven and follows the screens that
//! drive it: `login`, `update_profile` and `toggle_status` return errors so
//! a form can stay open, while `register` and `logout` report through the
//! notifier only and never fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::credentials::{Credential, CredentialStore};
use super::error::{SessionError, LOGIN_FAILED};
use crate::api::{ApiClient, ApiError, RoleEndpoints};
use crate::models::{FormPayload, Identity, LoginRequest, Role};
use crate::nav::{is_protected_path, Navigator};
use crate::notify::{Notice, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl SessionState {
    /// State before the first restore completes.
    pub fn initial() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Clears the loading flag when a restore ends, however it ends.
struct LoadingGuard<'a> {
    manager: &'a SessionManager,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.manager.update_state(|s| s.loading = false);
    }
}

pub struct SessionManager {
    role: Role,
    routes: &'static RoleEndpoints,
    api: ApiClient,
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
    live: AtomicBool,
}

impl SessionManager {
    /// Create a manager for `role`. The API client is rebound to `store` so
    /// the token it sends is always the one this manager wrote.
    pub fn new(
        role: Role,
        api: &ApiClient,
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            role,
            routes: RoleEndpoints::for_role(role),
            api: api.with_credentials(store.clone()),
            store,
            notifier,
            navigator,
            state,
            live: AtomicBool::new(true),
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// True when the cached identity belongs to another role.
    pub fn has_foreign_identity(&self) -> bool {
        self.state
            .borrow()
            .identity
            .as_ref()
            .map(|i| i.is_foreign(self.role))
            .unwrap_or(false)
    }

    /// Detach the owning view. Operations still in flight finish their
    /// network and storage work but no longer touch session state.
    pub fn unmount(&self) {
        debug!(role = %self.role, "Session manager unmounted");
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn update_state(&self, f: impl FnOnce(&mut SessionState)) {
        if !self.is_live() {
            debug!(role = %self.role, "Skipping state update after unmount");
            return;
        }
        self.state.send_modify(f);
    }

    fn clear_credential(&self) {
        if let Err(e) = self.store.clear() {
            error!(role = %self.role, error = %e, "Failed to clear stored credential");
        }
    }

    /// Authorization failure on an authenticated call. Always drops the
    /// credential and identity; the notice and redirect only happen on a
    /// protected path unless `force_redirect` is set.
    fn expire_session(&self, force_redirect: bool) {
        self.clear_credential();
        self.update_state(|s| s.identity = None);

        let path = self.navigator.current_path();
        if force_redirect || is_protected_path(&path) {
            warn!(role = %self.role, path = %path, "Session expired, redirecting to login");
            self.notifier.notify(Notice::error(SessionError::AuthExpired.to_string()));
            self.navigator.navigate(&self.role.login_path(), true);
        } else {
            debug!(role = %self.role, path = %path, "Session expired on public page");
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Silently restore the identity from the stored credential.
    ///
    /// Never fails: an authorization failure runs the expiry path, any other
    /// failure is logged and leaves the identity as it was. Returns the
    /// identity held afterwards.
    pub async fn restore(&self) -> Option<Identity> {
        self.update_state(|s| s.loading = true);
        let _loading = LoadingGuard { manager: self };

        match self.fetch_profile().await {
            Ok(identity) => identity,
            Err(SessionError::AuthExpired) => {
                self.expire_session(false);
                None
            }
            Err(e) => {
                error!(role = %self.role, error = %e, "Profile fetch failed");
                self.identity()
            }
        }
    }

    async fn fetch_profile(&self) -> Result<Option<Identity>, SessionError> {
        let Some(credential) = self.store.get()? else {
            debug!(role = %self.role, "No stored credential");
            self.update_state(|s| s.identity = None);
            return Ok(None);
        };
        if credential.role != self.role {
            debug!(stored = %credential.role, context = %self.role, "Restoring with credential from another role");
        }

        let body = self.api.profile(self.routes).await?;
        let identity = Identity::from_response(&body)
            .map_err(|e| SessionError::InvalidResponse(format!("Failed to parse profile: {}", e)))?;

        debug!(role = %self.role, found = identity.is_some(), "Profile restored");
        self.update_state(|s| s.identity = identity.clone());
        Ok(identity)
    }

    /// Log in, persist the credential, and populate the identity.
    ///
    /// The identity comes from the profile fetch that follows, or from the
    /// login body when that fetch fails for a reason other than
    /// authorization. `Ok(None)` means the login succeeded but neither source
    /// described the account; the published state then holds no identity
    /// either.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Option<Identity>, SessionError> {
        match self.try_login(credentials).await {
            Ok(identity) => {
                info!(role = %self.role, "Login successful");
                self.notifier.notify(Notice::success("Login successful!"));
                Ok(identity)
            }
            Err(e) => {
                warn!(role = %self.role, error = %e, "Login failed");
                self.notifier.notify(Notice::error(e.user_message()));
                Err(e)
            }
        }
    }

    async fn try_login(&self, credentials: &LoginRequest) -> Result<Option<Identity>, SessionError> {
        let body = self
            .api
            .login(self.routes, credentials)
            .await
            .map_err(login_error)?;

        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SessionError::AuthError("No token received".to_string()))?;

        self.store.set(&Credential::new(token, self.role))?;

        let restored = self.restore().await;
        if self.store.get()?.is_none() {
            return Err(SessionError::AuthExpired);
        }

        if restored.is_some() {
            return Ok(restored);
        }
        let fallback = login_body_identity(&body);
        if fallback.is_some() {
            debug!(role = %self.role, "Using identity from login response");
            self.update_state(|s| s.identity = fallback.clone());
        }
        Ok(fallback)
    }

    /// Create an account. Never logs in and never fails; the outcome is
    /// reported through the notifier only.
    pub async fn register(&self, payload: &FormPayload) {
        match self.api.register(self.routes, payload).await {
            Ok(_) => {
                info!(role = %self.role, "Registration successful");
                self.notifier
                    .notify(Notice::success("Registered successfully! Please login."));
                self.navigator.navigate(&self.role.login_path(), false);
            }
            Err(e) => {
                warn!(role = %self.role, error = %e, "Registration failed");
                let message = e.backend_provided().unwrap_or("Registration failed");
                self.notifier.notify(Notice::error(message));
            }
        }
    }

    /// Log out. The credential and identity are cleared even when the
    /// backend call fails.
    pub async fn logout(&self) {
        let backend = self.api.logout().await;

        self.clear_credential();
        self.update_state(|s| s.identity = None);

        match backend {
            Ok(()) => {
                info!(role = %self.role, "Logged out");
                self.notifier.notify(Notice::success("Logged out successfully!"));
            }
            Err(e) => {
                warn!(role = %self.role, error = %e, "Backend logout failed");
                self.notifier.notify(Notice::error("Logout failed"));
            }
        }
        self.navigator.navigate("/", true);
    }

    /// Update the profile and refresh the identity.
    ///
    /// Roles without an editable profile fail before any request is sent. An
    /// authorization failure always expires the session and redirects, since
    /// profile editing only happens on protected pages.
    pub async fn update_profile(&self, data: &FormPayload) -> Result<Option<Identity>, SessionError> {
        let Some(endpoint) = self.routes.update_profile else {
            let err = SessionError::UnsupportedOperation {
                operation: "Profile update",
                role: self.role,
            };
            self.notifier.notify(Notice::error(err.to_string()));
            return Err(err);
        };

        match self.api.update_profile(endpoint, data).await {
            Ok(_) => {}
            Err(ApiError::Unauthorized(_)) => {
                self.expire_session(true);
                return Err(SessionError::AuthExpired);
            }
            Err(e) => {
                error!(role = %self.role, error = %e, "Update profile failed");
                self.notifier.notify(Notice::error("Failed to update profile"));
                return Err(e.into());
            }
        }

        let identity = self.restore().await;
        self.notifier.notify(Notice::success("Profile updated successfully!"));
        Ok(identity)
    }

    /// Flip the restaurant's open/closed switch and mirror the new value on
    /// the cached identity. Other roles get `Ok(None)` and nothing happens.
    pub async fn toggle_status(&self) -> Result<Option<bool>, SessionError> {
        let Some(path) = self.routes.toggle_status else {
            debug!(role = %self.role, "Toggle status ignored for this role");
            return Ok(None);
        };

        let result = match self.api.toggle_status(path).await {
            Ok(body) => parse_is_active(&body).ok_or_else(|| {
                SessionError::InvalidResponse("isActive missing from toggle-status response".to_string())
            }),
            Err(ApiError::Unauthorized(_)) => {
                self.expire_session(false);
                return Err(SessionError::AuthExpired);
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(is_active) => {
                self.update_state(|s| {
                    if let Some(identity) = s.identity.as_mut() {
                        identity.is_active = Some(is_active);
                    }
                });
                info!(is_active, "Restaurant status toggled");
                Ok(Some(is_active))
            }
            Err(e) => {
                error!(error = %e, "Toggle status failed");
                self.notifier.notify(Notice::error("Failed to toggle restaurant status"));
                Err(e)
            }
        }
    }
}

fn login_error(err: ApiError) -> SessionError {
    match err {
        ApiError::NetworkError(e) => SessionError::NetworkFailure(e.to_string()),
        other => SessionError::AuthError(
            other
                .backend_provided()
                .map(str::to_string)
                .unwrap_or_else(|| LOGIN_FAILED.to_string()),
        ),
    }
}

/// The account described by a login body, ignoring the token itself. A body
/// carrying nothing but the token describes no one.
fn login_body_identity(body: &Value) -> Option<Identity> {
    let mut body = body.clone();
    if let Some(map) = body.as_object_mut() {
        map.remove("token");
    }
    Identity::from_response(&body)
        .ok()
        .flatten()
        .filter(|identity| *identity != Identity::default())
}

/// `isActive` from the toggle response: top level first, then nested under
/// `restaurant`.
fn parse_is_active(body: &Value) -> Option<bool> {
    body.get("isActive")
        .and_then(Value::as_bool)
        .or_else(|| body.get("restaurant")?.get("isActive")?.as_bool())
}
