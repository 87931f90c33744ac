//! # Dish Repository
//!
//! Read access for dishes and their recipes.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use fonda_core::{Dish, Ingredient};

/// Repository for dish and recipe reads.
#[derive(Debug, Clone)]
pub struct DishRepository {
    pool: SqlitePool,
}

const DISH_COLUMNS: &str = "id, name, price, is_active, created_at";

impl DishRepository {
    /// Creates a new DishRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DishRepository { pool }
    }

    /// Gets a dish by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Dish> {
        let sql = format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = ?1");

        sqlx::query_as::<_, Dish>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Dish", id))
    }

    /// Lists dishes sorted by name.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Dish>> {
        let sql = if include_inactive {
            format!("SELECT {DISH_COLUMNS} FROM dishes ORDER BY name")
        } else {
            format!("SELECT {DISH_COLUMNS} FROM dishes WHERE is_active = 1 ORDER BY name")
        };

        Ok(sqlx::query_as::<_, Dish>(&sql).fetch_all(&self.pool).await?)
    }

    /// Returns the recipe for a dish.
    ///
    /// An empty result is meaningful: a dish without a recipe cannot be
    /// sold, and the payment flow treats it as a hard error.
    pub async fn recipe(&self, dish_id: &str) -> DbResult<Vec<Ingredient>> {
        Ok(sqlx::query_as::<_, Ingredient>(
            "SELECT id, dish_id, product_id, quantity_per_unit \
             FROM ingredients WHERE dish_id = ?1 ORDER BY product_id",
        )
        .bind(dish_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Lists the dishes whose recipes use a given product.
    ///
    /// ## Usage
    /// Impact check before deactivating a product.
    pub async fn dishes_using_product(&self, product_id: &str) -> DbResult<Vec<Dish>> {
        Ok(sqlx::query_as::<_, Dish>(
            "SELECT d.id, d.name, d.price, d.is_active, d.created_at \
             FROM dishes d \
             INNER JOIN ingredients i ON i.dish_id = d.id \
             WHERE i.product_id = ?1 ORDER BY d.name",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
