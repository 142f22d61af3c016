//! Route guarding on top of the session manager.

use tokio::sync::OnceCell;
use tracing::debug;

use super::credentials::{stored_role, CredentialStore};
use super::session::{SessionManager, SessionState};
use crate::models::{Identity, Role};

/// What a protected route should do given the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Restore still running; show a neutral placeholder.
    Checking,
    Unauthenticated { redirect: String },
    /// Logged in, but as another role.
    RoleMismatch { redirect: String },
    Authorized(Identity),
}

impl GuardDecision {
    pub fn evaluate(state: &SessionState, role: Role) -> Self {
        if state.loading {
            return GuardDecision::Checking;
        }
        match &state.identity {
            None => GuardDecision::Unauthenticated {
                redirect: role.login_path(),
            },
            Some(identity) if identity.is_foreign(role) => GuardDecision::RoleMismatch {
                redirect: format!("/{}/dashboard", identity.role.as_deref().unwrap_or_default()),
            },
            Some(identity) => GuardDecision::Authorized(identity.clone()),
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            GuardDecision::Unauthenticated { redirect } | GuardDecision::RoleMismatch { redirect } => {
                Some(redirect.as_str())
            }
            GuardDecision::Checking | GuardDecision::Authorized(_) => None,
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardDecision::Authorized(_))
    }
}

/// Guard for one mounted protected route. Restores the session at most once
/// however many times it is checked.
pub struct RouteGuard {
    role: Role,
    restored: OnceCell<()>,
}

impl RouteGuard {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            restored: OnceCell::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn has_restored(&self) -> bool {
        self.restored.initialized()
    }

    pub async fn check(&self, manager: &SessionManager) -> GuardDecision {
        self.restored
            .get_or_init(|| async {
                debug!(role = %self.role, "Guard restoring session");
                manager.restore().await;
            })
            .await;
        GuardDecision::evaluate(&manager.state(), self.role)
    }
}

/// Login and register pages bounce a visitor already holding a credential
/// for `role` to that role's dashboard.
pub fn login_redirect(store: &dyn CredentialStore, role: Role) -> Option<String> {
    (stored_role(store) == Some(role)).then(|| role.dashboard_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, MemoryStore};

    fn settled(identity: Option<Identity>) -> SessionState {
        SessionState {
            identity,
            loading: false,
        }
    }

    #[test]
    fn test_evaluate_checking() {
        assert_eq!(
            GuardDecision::evaluate(&SessionState::initial(), Role::User),
            GuardDecision::Checking
        );
    }

    #[test]
    fn test_evaluate_unauthenticated() {
        let decision = GuardDecision::evaluate(&settled(None), Role::Restaurant);
        assert_eq!(decision.redirect(), Some("/restaurant/login"));
    }

    #[test]
    fn test_evaluate_role_mismatch() {
        let identity = Identity {
            role: Some("restaurant".to_string()),
            ..Default::default()
        };
        let decision = GuardDecision::evaluate(&settled(Some(identity)), Role::User);
        assert_eq!(
            decision,
            GuardDecision::RoleMismatch {
                redirect: "/restaurant/dashboard".to_string()
            }
        );
    }

    #[test]
    fn test_evaluate_authorized() {
        let identity = Identity {
            name: Some("Ann".to_string()),
            role: Some("user".to_string()),
            ..Default::default()
        };
        let decision = GuardDecision::evaluate(&settled(Some(identity)), Role::User);
        assert!(decision.is_authorized());
        assert_eq!(decision.redirect(), None);
    }

    #[test]
    fn test_login_redirect() {
        let store = MemoryStore::new();
        assert_eq!(login_redirect(&store, Role::User), None);

        store.set(&Credential::new("t", Role::User)).unwrap();
        assert_eq!(login_redirect(&store, Role::User), Some("/user/dashboard".to_string()));
        assert_eq!(login_redirect(&store, Role::Admin), None);
    }
}
