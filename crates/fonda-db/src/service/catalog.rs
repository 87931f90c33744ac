//! # Catalog Service
//!
//! Product and dish administration.
//!
//! ## Opening Stock Goes Through the Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_product("Tomate", "kg", initial: 10.0 @ 2.50)                   │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT products (stock = 0)                                          │
//! │    apply_purchase(10.0, 2.50, source = PRODUCT_INITIAL)                 │
//! │      → stock 10.0, avg 2.50, movement #1                                │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  No product ever gets stock without a movement explaining it:           │
//! │  opening balances are audited like everything else.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use crate::service::inventory;
use fonda_core::validation::{
    validate_ingredients, validate_name, validate_price, validate_unit,
};
use fonda_core::{source, CoreError, Dish, Ingredient, Product};

/// Optional opening balance for a new product.
#[derive(Debug, Clone, Copy)]
pub struct InitialStock {
    pub quantity: f64,
    pub unit_cost: f64,
}

/// Service for product and dish administration.
#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    /// Creates a new CatalogService.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogService { pool }
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Creates a product. Unit aliases are normalized (`kilo` → `kg`, ...).
    ///
    /// If `initial` is given, the opening stock enters the ledger as a
    /// Purchase movement with source `PRODUCT_INITIAL`, in the same
    /// transaction as the insert.
    pub async fn create_product(
        &self,
        name: &str,
        unit_raw: &str,
        initial: Option<InitialStock>,
    ) -> DbResult<Product> {
        validate_name("name", name).map_err(CoreError::from)?;
        let unit = validate_unit(unit_raw).map_err(CoreError::from)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            unit,
            stock: 0.0,
            avg_cost: 0.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO products (id, name, unit, stock, avg_cost, is_active, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.unit)
        .bind(product.stock)
        .bind(product.avg_cost)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        let product = if let Some(initial) = initial {
            let movement = inventory::apply_purchase(
                &mut tx,
                &product.id,
                initial.quantity,
                initial.unit_cost,
                source::PRODUCT_INITIAL,
                &product.id,
            )
            .await?;

            Product {
                stock: movement.resulting_stock,
                avg_cost: movement.resulting_avg_cost,
                ..product
            }
        } else {
            product
        };

        tx.commit().await?;

        info!(name = %product.name, unit = ?product.unit, "Product created");
        Ok(product)
    }

    /// Renames a product.
    pub async fn rename_product(&self, id: &str, name: &str) -> DbResult<()> {
        validate_name("name", name).map_err(CoreError::from)?;

        let result =
            sqlx::query("UPDATE products SET name = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(name.trim())
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", id).into());
        }
        Ok(())
    }

    /// Activates or deactivates a product.
    ///
    /// Deactivation is a soft delete: the ledger history stays intact, and
    /// the product simply stops participating in new operations.
    pub async fn set_product_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(active)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", id).into());
        }

        info!(product_id = id, active, "Product active flag changed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Dishes
    // -------------------------------------------------------------------------

    /// Creates a dish, optionally with its recipe.
    ///
    /// A dish without ingredients is valid (recipe pending) but cannot be
    /// paid for until the recipe exists.
    pub async fn create_dish(
        &self,
        name: &str,
        price: f64,
        ingredients: &[(String, f64)],
    ) -> DbResult<Dish> {
        validate_name("name", name).map_err(CoreError::from)?;
        validate_price(price).map_err(CoreError::from)?;
        if !ingredients.is_empty() {
            validate_ingredients(ingredients).map_err(CoreError::from)?;
        }

        let dish = Dish {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            price,
            is_active: true,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO dishes (id, name, price, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&dish.id)
        .bind(&dish.name)
        .bind(dish.price)
        .bind(dish.is_active)
        .bind(dish.created_at)
        .execute(&mut *tx)
        .await?;

        for (product_id, quantity_per_unit) in ingredients {
            // Existence + active check rides the same transaction
            inventory::load_active_product(&mut tx, product_id).await?;

            sqlx::query(
                "INSERT INTO ingredients (id, dish_id, product_id, quantity_per_unit) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&dish.id)
            .bind(product_id)
            .bind(*quantity_per_unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(name = %dish.name, ingredients = ingredients.len(), "Dish created");
        Ok(dish)
    }

    /// Replaces a dish's entire ingredient set atomically.
    pub async fn replace_ingredients(
        &self,
        dish_id: &str,
        ingredients: &[(String, f64)],
    ) -> DbResult<Vec<Ingredient>> {
        validate_ingredients(ingredients).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let exists: Option<(String,)> =
            sqlx::query_as("SELECT id FROM dishes WHERE id = ?1")
                .bind(dish_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(CoreError::not_found("Dish", dish_id).into());
        }

        sqlx::query("DELETE FROM ingredients WHERE dish_id = ?1")
            .bind(dish_id)
            .execute(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(ingredients.len());
        for (product_id, quantity_per_unit) in ingredients {
            inventory::load_active_product(&mut tx, product_id).await?;

            let entry = Ingredient {
                id: Uuid::new_v4().to_string(),
                dish_id: dish_id.to_string(),
                product_id: product_id.clone(),
                quantity_per_unit: *quantity_per_unit,
            };

            sqlx::query(
                "INSERT INTO ingredients (id, dish_id, product_id, quantity_per_unit) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&entry.id)
            .bind(&entry.dish_id)
            .bind(&entry.product_id)
            .bind(entry.quantity_per_unit)
            .execute(&mut *tx)
            .await?;

            created.push(entry);
        }

        tx.commit().await?;

        info!(dish_id, ingredients = created.len(), "Recipe replaced");
        Ok(created)
    }

    /// Updates a dish's price. Existing order lines keep their frozen price.
    pub async fn set_dish_price(&self, id: &str, price: f64) -> DbResult<()> {
        validate_price(price).map_err(CoreError::from)?;

        let result = sqlx::query("UPDATE dishes SET price = ?1 WHERE id = ?2")
            .bind(price)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Dish", id).into());
        }
        Ok(())
    }

    /// Activates or deactivates a dish.
    pub async fn set_dish_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE dishes SET is_active = ?1 WHERE id = ?2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Dish", id).into());
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tables
    // -------------------------------------------------------------------------

    /// Creates a dining table with the given public number.
    pub async fn create_table(&self, number: i64) -> DbResult<fonda_core::DiningTable> {
        let table = fonda_core::DiningTable {
            id: Uuid::new_v4().to_string(),
            number,
            state: fonda_core::TableState::Free,
        };

        sqlx::query("INSERT INTO dining_tables (id, number, state) VALUES (?1, ?2, ?3)")
            .bind(&table.id)
            .bind(table.number)
            .bind(table.state)
            .execute(&self.pool)
            .await?;

        Ok(table)
    }

    /// Manually frees a table (e.g. after a correction).
    ///
    /// Rejected while any non-terminal order still references the table; the
    /// order must be cancelled or paid first. Freeing a free table is a no-op.
    pub async fn free_table(&self, table_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let table = sqlx::query_as::<_, fonda_core::DiningTable>(
            "SELECT id, number, state FROM dining_tables WHERE id = ?1",
        )
        .bind(table_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("Table", table_id))?;

        let (active,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM orders \
             WHERE table_id = ?1 AND status IN ('open', 'preparation', 'served')",
        )
        .bind(table_id)
        .fetch_one(&mut *tx)
        .await?;

        if active > 0 {
            return Err(CoreError::TableHasActiveOrder {
                number: table.number,
            }
            .into());
        }

        sqlx::query("UPDATE dining_tables SET state = ?1 WHERE id = ?2")
            .bind(fonda_core::TableState::Free)
            .bind(table_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
