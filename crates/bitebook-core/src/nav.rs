//! Navigation collaborator and protected-path rules.

use std::sync::{Arc, Mutex};

use tracing::debug;

/// Path segments that mark a route as requiring an identity.
const PROTECTED_SEGMENTS: [&str; 7] = [
    "dashboard",
    "orders",
    "profile",
    "restaurant",
    "admin",
    "manage",
    "approvals",
];

/// Entry points that stay public even under a protected prefix.
const PUBLIC_LEAVES: [&str; 2] = ["login", "register"];

/// Current location plus the ability to move somewhere else.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    /// Go to `to`; `replace` swaps the current history entry instead of
    /// pushing a new one.
    fn navigate(&self, to: &str, replace: bool);
}

/// Whether `path` is a protected route.
///
/// Query strings and fragments are ignored. `/user/login`,
/// `/restaurant/register`, `/`, `/menu/:id` and `/order/:id` are public;
/// dashboards, order lists, profiles and everything under `/restaurant` or
/// `/admin` are protected.
pub fn is_protected_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.last() {
        None => false,
        Some(leaf) if PUBLIC_LEAVES.contains(leaf) => false,
        Some(_) => segments.iter().any(|s| PROTECTED_SEGMENTS.contains(s)),
    }
}

/// In-memory history stack. Clones share the same history.
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    entries: Arc<Mutex<Vec<String>>>,
}

impl HistoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(vec![start.into()])),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, to: &str, replace: bool) {
        debug!(to, replace, "Navigating");
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if replace {
            entries.pop();
        }
        entries.push(to.to_string());
    }
}
