use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::ProductKey;
use crate::entities::{prelude::*, products};
use crate::models::{Product, ProductFilter};

/// Escapes `LIKE` metacharacters so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for catalog products
pub struct ProductRepository {
    conn: DatabaseConnection,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: products::Model) -> Product {
        Product {
            key: ProductKey::from(m.key),
            name: m.name,
            description: m.description,
            price: m.price,
            image: m.image,
            category: m.category,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    fn to_active_model(p: &Product) -> products::ActiveModel {
        products::ActiveModel {
            key: Set(p.key.as_str().to_string()),
            name: Set(p.name.clone()),
            description: Set(p.description.clone()),
            price: Set(p.price),
            image: Set(p.image.clone()),
            category: Set(p.category.clone()),
            created_at: Set(p.created_at.clone()),
            updated_at: Set(p.updated_at.clone()),
        }
    }

    pub async fn get(&self, key: &ProductKey) -> Result<Option<Product>> {
        let row = Products::find_by_id(key.as_str())
            .one(&self.conn)
            .await
            .context("Failed to query product by key")?;

        Ok(row.map(Self::map_model))
    }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let mut condition = Condition::all();

        // SQLite LIKE is case-insensitive for ASCII
        if let Some(category) = &filter.category {
            let pattern = format!("%{}%", escape_like(category));
            condition = condition.add(
                Expr::col(products::Column::Category)
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        if let Some(min) = filter.min_price {
            condition = condition.add(products::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            condition = condition.add(products::Column::Price.lte(max));
        }

        let rows = Products::find()
            .filter(condition)
            .order_by_asc(products::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list products")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn insert(&self, product: &Product) -> Result<()> {
        Products::insert(Self::to_active_model(product))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to insert product {}", product.key))?;
        Ok(())
    }

    pub async fn replace(&self, product: &Product) -> Result<bool> {
        match Self::to_active_model(product).update(&self.conn).await {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotUpdated) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to update product {}", product.key)),
        }
    }

    pub async fn delete(&self, key: &ProductKey) -> Result<Option<Product>> {
        let Some(existing) = self.get(key).await? else {
            return Ok(None);
        };

        Products::delete_by_id(key.as_str())
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to delete product {key}"))?;

        Ok(Some(existing))
    }
}
