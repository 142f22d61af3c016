//! The normalized "current user" record.
//!
//! The profile and login endpoints return the identity nested under a
//! role-specific key (`user`, `restaurant`) or flat at the top level.
//! [`Identity::from_response`] resolves those shapes through an ordered
//! fallback chain so callers only ever see one record type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Role;

/// Keys checked, in order, before falling back to the response body itself.
const NESTED_IDENTITY_KEYS: [&str; 2] = ["user", "restaurant"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "isActive", default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Fields the backend sends that are not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Normalize a profile/login response body into an identity.
    ///
    /// Tries `body.user`, then `body.restaurant`, then `body` itself; the
    /// first candidate that is a JSON object wins. Returns `Ok(None)` when
    /// none of them is an object.
    pub fn from_response(body: &Value) -> serde_json::Result<Option<Self>> {
        let nested = NESTED_IDENTITY_KEYS
            .iter()
            .filter_map(|key| body.get(*key))
            .find(|candidate| candidate.is_object());

        match nested.or_else(|| body.is_object().then_some(body)) {
            Some(candidate) => Ok(Some(Self::deserialize(candidate)?)),
            None => Ok(None),
        }
    }

    /// The role tag carried by the record, if it parses.
    pub fn role_tag(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// True when the record carries a role different from `context`.
    /// Records without a role tag are never foreign.
    pub fn is_foreign(&self, context: Role) -> bool {
        match self.role.as_deref() {
            Some(role) => !role.eq_ignore_ascii_case(context.as_str()),
            None => false,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Unknown")
    }
}
