//! # Product Repository
//!
//! Read access for products and the movement ledger (kardex).
//!
//! ## The Kardex
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Kardex = Per-Product Movement History                     │
//! │                                                                         │
//! │  movements WHERE product_id = ? ORDER BY id                             │
//! │                                                                         │
//! │  seq │ kind      │ qty    │ unit_cost │ stock │ avg_cost                │
//! │  ────┼───────────┼────────┼───────────┼───────┼─────────                │
//! │   1  │ purchase  │ +10.0  │   2.00    │ 10.0  │  2.00                   │
//! │   2  │ purchase  │ +10.0  │   4.00    │ 20.0  │  3.00                   │
//! │   3  │ sale      │  -2.0  │   3.00    │ 18.0  │  3.00                   │
//! │                                                                         │
//! │  The last row's (stock, avg_cost) always equals the product snapshot.   │
//! │  Ordering is by the AUTOINCREMENT id, never by timestamp: rows written  │
//! │  in one transaction share a created_at.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use fonda_core::{Movement, Product};

/// Repository for product reads and the movement ledger.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id("uuid-here").await?;
/// let history = repo.kardex("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str =
    "id, name, unit, stock, avg_cost, is_active, created_at, updated_at";

const MOVEMENT_COLUMNS: &str = "id, product_id, kind, source_type, source_id, quantity, \
     unit_cost, resulting_stock, resulting_avg_cost, created_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by its unique name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1");

        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Lists products sorted by name.
    ///
    /// ## Arguments
    /// * `include_inactive` - When false, only active products are returned
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Product>> {
        let sql = if include_inactive {
            format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name")
        } else {
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name")
        };

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists active products whose stock is at or below the given threshold.
    ///
    /// ## Usage
    /// Restock report: `repo.low_stock(5.0).await?`
    pub async fn low_stock(&self, threshold: f64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND stock <= ?1 ORDER BY stock ASC, name"
        );

        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Returns the full movement history for a product, oldest first.
    ///
    /// Ordered by the ledger sequence id so rows written inside one
    /// transaction keep their insertion order.
    pub async fn kardex(&self, product_id: &str) -> DbResult<Vec<Movement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE product_id = ?1 ORDER BY id"
        );

        Ok(sqlx::query_as::<_, Movement>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Returns the most recent movement for a product, if any.
    pub async fn last_movement(&self, product_id: &str) -> DbResult<Option<Movement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements \
             WHERE product_id = ?1 ORDER BY id DESC LIMIT 1"
        );

        Ok(sqlx::query_as::<_, Movement>(&sql)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Returns all movements attributed to a source document.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // All stock consumed by one order
    /// let moves = repo.movements_for_source("order", &order_id).await?;
    /// ```
    pub async fn movements_for_source(
        &self,
        source_type: &str,
        source_id: &str,
    ) -> DbResult<Vec<Movement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements \
             WHERE source_type = ?1 AND source_id = ?2 ORDER BY id"
        );

        Ok(sqlx::query_as::<_, Movement>(&sql)
            .bind(source_type)
            .bind(source_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
