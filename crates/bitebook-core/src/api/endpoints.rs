//! Role to endpoint lookup.
//!
//! Each role talks to a slightly different set of auth routes. The table is
//! resolved once per session so operations never branch on the role again.

use crate::models::Role;

/// How a form payload is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEncoding {
    Json,
    Multipart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormEndpoint {
    pub path: &'static str,
    pub encoding: FormEncoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleEndpoints {
    pub role: Role,
    pub register: FormEndpoint,
    pub login: &'static str,
    pub profile: &'static str,
    /// `None` when the role cannot edit its profile.
    pub update_profile: Option<FormEndpoint>,
    /// `None` for roles without an open/closed switch.
    pub toggle_status: Option<&'static str>,
}

pub const LOGOUT: &str = "/api/auth/logout";
pub const HEALTH: &str = "/api/health";

pub const MENU_ITEMS: &str = "/api/menu-items";
pub const ORDERS: &str = "/api/orders";
pub const PENDING_RESTAURANTS: &str = "/api/admin/restaurants/pending";

const USER: RoleEndpoints = RoleEndpoints {
    role: Role::User,
    register: FormEndpoint {
        path: "/api/auth/user/register",
        encoding: FormEncoding::Json,
    },
    login: "/api/auth/user/login",
    profile: "/api/auth/user/profile",
    update_profile: Some(FormEndpoint {
        path: "/api/auth/user/profile",
        encoding: FormEncoding::Json,
    }),
    toggle_status: None,
};

const RESTAURANT: RoleEndpoints = RoleEndpoints {
    role: Role::Restaurant,
    register: FormEndpoint {
        path: "/api/restaurant/register",
        encoding: FormEncoding::Multipart,
    },
    login: "/api/restaurant/login",
    profile: "/api/restaurant/profile",
    update_profile: Some(FormEndpoint {
        path: "/api/restaurant/profile",
        encoding: FormEncoding::Multipart,
    }),
    toggle_status: Some("/api/restaurant/toggle-status"),
};

const ADMIN: RoleEndpoints = RoleEndpoints {
    role: Role::Admin,
    register: FormEndpoint {
        path: "/api/auth/admin/register",
        encoding: FormEncoding::Json,
    },
    login: "/api/auth/admin/login",
    profile: "/api/auth/admin/profile",
    update_profile: None,
    toggle_status: None,
};

impl RoleEndpoints {
    pub fn for_role(role: Role) -> &'static RoleEndpoints {
        match role {
            Role::User => &USER,
            Role::Restaurant => &RESTAURANT,
            Role::Admin => &ADMIN,
        }
    }
}

pub fn menu_items_for_restaurant(restaurant_id: &str) -> String {
    format!("{}/restaurant/{}", MENU_ITEMS, restaurant_id)
}

pub fn menu_item(id: &str) -> String {
    format!("{}/{}", MENU_ITEMS, id)
}

pub fn order(id: &str) -> String {
    format!("{}/{}", ORDERS, id)
}

pub fn approve_restaurant(id: &str) -> String {
    format!("/api/admin/restaurants/{}/approve", id)
}

pub fn reject_restaurant(id: &str) -> String {
    format!("/api/admin/restaurants/{}/reject", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_role() {
        for role in Role::ALL {
            assert_eq!(RoleEndpoints::for_role(role).role, role);
        }
    }

    #[test]
    fn test_role_capabilities() {
        assert!(RoleEndpoints::for_role(Role::Admin).update_profile.is_none());
        assert!(RoleEndpoints::for_role(Role::User).toggle_status.is_none());
        assert_eq!(
            RoleEndpoints::for_role(Role::Restaurant).register.encoding,
            FormEncoding::Multipart
        );
        assert_eq!(
            RoleEndpoints::for_role(Role::User).update_profile.map(|e| e.encoding),
            Some(FormEncoding::Json)
        );
    }

    #[test]
    fn test_path_builders() {
        assert_eq!(menu_items_for_restaurant("r1"), "/api/menu-items/restaurant/r1");
        assert_eq!(order("o9"), "/api/orders/o9");
        assert_eq!(approve_restaurant("r2"), "/api/admin/restaurants/r2/approve");
    }
}
