use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShippingAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub title: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Weight in grams; unknown when the variant carries no weight.
    pub weight: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Order {
    pub id: Option<String>,
    pub display_id: Option<i64>,
    pub email: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
}
