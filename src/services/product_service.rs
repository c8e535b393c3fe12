//! Domain service for the product catalog.

use thiserror::Error;

use crate::domain::ProductKey;
use crate::models::{NewProduct, Product, ProductFilter, ProductUpdate};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    /// A listing matched nothing.
    #[error("No products found")]
    NoMatches,

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ProductError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product, ProductError>;

    /// # Errors
    ///
    /// Returns [`ProductError::NoMatches`] instead of an empty list.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductError>;

    async fn get(&self, key: &ProductKey) -> Result<Product, ProductError>;

    /// Applies only the provided fields.
    async fn update(
        &self,
        key: &ProductKey,
        update: ProductUpdate,
    ) -> Result<Product, ProductError>;

    /// Removes the product and returns what was deleted.
    async fn delete(&self, key: &ProductKey) -> Result<Product, ProductError>;
}
