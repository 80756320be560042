use serde::{Deserialize, Serialize};

/// A catalogue entry as served by the upstream store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    #[serde(rename = "productName")]
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub discount: i64,
    pub availability: String, // e.g. "yes", "out-of-stock"
    pub company: String,
    pub category: String,
}
