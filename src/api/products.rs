use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::auth::{ActiveUser, AdminUser};
use super::validation::{validate_key, validate_product_filter};
use super::{ApiError, AppState};
use crate::constants::messages;
use crate::domain::ProductKey;
use crate::models::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::services::ProductError;

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => Self::NotFound("Product not found".to_string()),
            ProductError::NoMatches => Self::NotFound(messages::NO_PRODUCTS.to_string()),
            ProductError::Validation(msg) => Self::validation(msg),
            ProductError::Internal(msg) => Self::internal(msg),
        }
    }
}

fn product_key(key: String) -> Result<ProductKey, ApiError> {
    validate_key("Product", &key)?;
    Ok(ProductKey::from(key))
}

/// POST /products/create
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<NewProduct>,
) -> Result<Json<Product>, ApiError> {
    let product = state.product_service().create(payload).await?;
    Ok(Json(product))
}

/// GET /products/all
///
/// Any verified user may list; an empty result is a 404.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    ActiveUser(_user): ActiveUser,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    validate_product_filter(&filter)?;
    let products = state.product_service().list(&filter).await?;
    Ok(Json(products))
}

/// GET /products/{key}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.product_service().get(&product_key(key)?).await?;
    Ok(Json(product))
}

/// PUT /products/update/{key}
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(key): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .product_service()
        .update(&product_key(key)?, payload)
        .await?;
    Ok(Json(product))
}

/// DELETE /products/delete/{key}
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(key): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.product_service().delete(&product_key(key)?).await?;
    Ok(Json(product))
}
