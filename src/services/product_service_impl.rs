//! `SeaORM` implementation of the `ProductService` trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::constants::limits::PRODUCT_NAME_MAX_LEN;
use crate::db::Store;
use crate::domain::ProductKey;
use crate::models::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::services::product_service::{ProductError, ProductService};

pub struct SeaOrmProductService {
    store: Store,
}

impl SeaOrmProductService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn validate_name(name: &str) -> Result<String, ProductError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductError::Validation(
                "Product name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > PRODUCT_NAME_MAX_LEN {
            return Err(ProductError::Validation(format!(
                "Product name must be {PRODUCT_NAME_MAX_LEN} characters or less"
            )));
        }
        Ok(name.to_string())
    }

    fn validate_price(price: f64) -> Result<f64, ProductError> {
        if !price.is_finite() || price < 0.0 {
            return Err(ProductError::Validation(format!(
                "Invalid price: {price}. Price must be a non-negative number"
            )));
        }
        Ok(price)
    }

    /// Blank categories are stored as absent.
    fn normalize_category(category: Option<String>) -> Option<String> {
        category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }
}

#[async_trait]
impl ProductService for SeaOrmProductService {
    async fn create(&self, product: NewProduct) -> Result<Product, ProductError> {
        let now = Utc::now().to_rfc3339();
        let product = Product {
            key: ProductKey::generate(),
            name: Self::validate_name(&product.name)?,
            description: product.description,
            price: Self::validate_price(product.price)?,
            image: product.image,
            category: Self::normalize_category(product.category),
            created_at: now.clone(),
            updated_at: now,
        };

        self.store.insert_product(&product).await?;

        info!(product_key = %product.key, name = %product.name, "Product created");
        Ok(product)
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductError> {
        let products = self.store.list_products(filter).await?;
        if products.is_empty() {
            return Err(ProductError::NoMatches);
        }
        Ok(products)
    }

    async fn get(&self, key: &ProductKey) -> Result<Product, ProductError> {
        self.store
            .get_product(key)
            .await?
            .ok_or(ProductError::NotFound)
    }

    async fn update(
        &self,
        key: &ProductKey,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        let mut product = self.get(key).await?;

        if let Some(name) = update.name {
            product.name = Self::validate_name(&name)?;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = Self::validate_price(price)?;
        }
        if let Some(image) = update.image {
            product.image = image;
        }
        if update.category.is_some() {
            product.category = Self::normalize_category(update.category);
        }
        product.updated_at = Utc::now().to_rfc3339();

        if !self.store.replace_product(&product).await? {
            return Err(ProductError::NotFound);
        }

        info!(product_key = %product.key, "Product updated");
        Ok(product)
    }

    async fn delete(&self, key: &ProductKey) -> Result<Product, ProductError> {
        let product = self
            .store
            .delete_product(key)
            .await?
            .ok_or(ProductError::NotFound)?;

        info!(product_key = %product.key, "Product deleted");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmProductService {
        SeaOrmProductService::new(Store::new("sqlite::memory:").await.unwrap())
    }

    fn new_product(name: &str, price: f64, category: Option<&str>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price,
            image: String::new(),
            category: category.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let service = service().await;
        let created = service
            .create(new_product("  Lamp ", 20.0, Some("Home")))
            .await
            .unwrap();
        assert_eq!(created.name, "Lamp");

        let fetched = service.get(&created.key).await.unwrap();
        assert_eq!(fetched, created);

        let updated = service
            .update(
                &created.key,
                ProductUpdate {
                    price: Some(25.5),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!((updated.price - 25.5).abs() < f64::EPSILON);
        assert_eq!(updated.name, "Lamp");
        assert_eq!(updated.category.as_deref(), Some("Home"));

        let deleted = service.delete(&created.key).await.unwrap();
        assert_eq!(deleted.key, created.key);
        assert!(matches!(
            service.get(&created.key).await,
            Err(ProductError::NotFound)
        ));
        assert!(matches!(
            service.delete(&created.key).await,
            Err(ProductError::NotFound)
        ));
    }

    #[tokio::test]
    async fn category_wildcards_match_literally() {
        let service = service().await;
        service
            .create(new_product("Chair", 50.0, Some("Furniture")))
            .await
            .unwrap();
        service
            .create(new_product("Sale", 5.0, Some("50% off")))
            .await
            .unwrap();

        for wildcard in ["F_rn", "_"] {
            assert!(
                matches!(
                    service
                        .list(&ProductFilter {
                            category: Some(wildcard.to_string()),
                            ..ProductFilter::default()
                        })
                        .await,
                    Err(ProductError::NoMatches)
                ),
                "{wildcard}"
            );
        }

        for literal in ["%", "0% OFF"] {
            let found = service
                .list(&ProductFilter {
                    category: Some(literal.to_string()),
                    ..ProductFilter::default()
                })
                .await
                .unwrap();
            let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["Sale"], "{literal}");
        }
    }

    #[tokio::test]
    async fn list_filters_and_reports_empty() {
        let service = service().await;
        assert!(matches!(
            service.list(&ProductFilter::default()).await,
            Err(ProductError::NoMatches)
        ));

        service
            .create(new_product("Chair", 50.0, Some("Furniture")))
            .await
            .unwrap();
        service
            .create(new_product("Desk", 150.0, Some("Office Furniture")))
            .await
            .unwrap();
        service
            .create(new_product("Pen", 2.0, Some("Office")))
            .await
            .unwrap();

        let furniture = service
            .list(&ProductFilter {
                category: Some("furniture".to_string()),
                ..ProductFilter::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = furniture.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Chair", "Desk"]);

        let bounded = service
            .list(&ProductFilter {
                category: None,
                min_price: Some(2.0),
                max_price: Some(50.0),
            })
            .await
            .unwrap();
        assert_eq!(bounded.len(), 2);

        assert!(matches!(
            service
                .list(&ProductFilter {
                    min_price: Some(1000.0),
                    ..ProductFilter::default()
                })
                .await,
            Err(ProductError::NoMatches)
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let service = service().await;
        assert!(matches!(
            service.create(new_product("   ", 1.0, None)).await,
            Err(ProductError::Validation(_))
        ));
        assert!(matches!(
            service.create(new_product("Thing", -1.0, None)).await,
            Err(ProductError::Validation(_))
        ));
        assert!(matches!(
            service.create(new_product("Thing", f64::NAN, None)).await,
            Err(ProductError::Validation(_))
        ));
    }
}
