use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The role context a session operates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Restaurant,
    Admin,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0} (expected user, restaurant or admin)")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Restaurant, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Restaurant => "restaurant",
            Role::Admin => "admin",
        }
    }

    /// Role-scoped login route, e.g. `/user/login`.
    pub fn login_path(&self) -> String {
        format!("/{}/login", self.as_str())
    }

    /// Role-scoped landing route after authentication.
    pub fn dashboard_path(&self) -> String {
        format!("/{}/dashboard", self.as_str())
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "Customer",
            Role::Restaurant => "Restaurant",
            Role::Admin => "Administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "restaurant" => Ok(Role::Restaurant),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_paths() {
        assert_eq!(Role::User.login_path(), "/user/login");
        assert_eq!(Role::Restaurant.dashboard_path(), "/restaurant/dashboard");
        assert_eq!(Role::Admin.login_path(), "/admin/login");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!(" Restaurant ".parse::<Role>(), Ok(Role::Restaurant));
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("courier".parse::<Role>(), Err(UnknownRole("courier".to_string())));
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Restaurant).unwrap(), "\"restaurant\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
