use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub category: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: Option<String>,
    pub status: Option<String>,
}

impl MenuItem {
    pub fn status_kind(&self) -> MenuItemStatus {
        MenuItemStatus::from_str(self.status.as_deref())
    }

    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// Availability of a menu item. Items without a status are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemStatus {
    Available,
    Unavailable,
}

impl MenuItemStatus {
    pub fn from_str(s: Option<&str>) -> Self {
        match s {
            Some(status) if status.eq_ignore_ascii_case("unavailable") => MenuItemStatus::Unavailable,
            _ => MenuItemStatus::Available,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItemStatus::Available => "available",
            MenuItemStatus::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemsResponse {
    #[serde(rename = "menuItems", default)]
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemResponse {
    #[serde(rename = "menuItem")]
    pub menu_item: MenuItem,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_items_response() {
        let json = r#"{"success":true,"menuItems":[{"_id":"m1","name":"Pho","price":11.5,"category":"main","imageUrl":"https://img/pho.jpg","restaurantId":"r1"},{"_id":"m2","name":"Spring Rolls","price":6,"status":"unavailable"}]}"#;
        let resp: MenuItemsResponse = serde_json::from_str(json).expect("Failed to parse menu JSON");
        assert_eq!(resp.menu_items.len(), 2);
        assert_eq!(resp.menu_items[0].restaurant_id.as_deref(), Some("r1"));
        assert_eq!(resp.menu_items[0].status_kind(), MenuItemStatus::Available);
        assert_eq!(resp.menu_items[1].status_kind(), MenuItemStatus::Unavailable);
        assert_eq!(resp.menu_items[1].display_price(), "$6.00");
    }

    #[test]
    fn test_missing_menu_items_key_is_empty() {
        let resp: MenuItemsResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.menu_items.is_empty());
    }
}
