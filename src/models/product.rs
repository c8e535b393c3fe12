use serde::{Deserialize, Serialize};

use crate::domain::ProductKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub key: ProductKey,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub category: Option<String>,
}

/// Listing filter. Price bounds are inclusive, category is a
/// case-insensitive substring match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}
