use serde::{Deserialize, Serialize};

/// A restaurant registration awaiting admin approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRestaurant {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingRestaurantsResponse {
    #[serde(default)]
    pub restaurants: Vec<PendingRestaurant>,
}
