//! # Purchase Repository
//!
//! Read access for purchases and purchase lines.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use fonda_core::{Purchase, PurchaseLine};

/// Repository for purchase reads and listings.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

const PURCHASE_COLUMNS: &str = "id, supplier, date, total";

const LINE_COLUMNS: &str = "id, purchase_id, product_id, quantity, unit_cost, subtotal";

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Purchase> {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1");

        sqlx::query_as::<_, Purchase>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))
    }

    /// Returns the lines of a purchase.
    pub async fn lines(&self, purchase_id: &str) -> DbResult<Vec<PurchaseLine>> {
        let sql =
            format!("SELECT {LINE_COLUMNS} FROM purchase_lines WHERE purchase_id = ?1 ORDER BY id");

        Ok(sqlx::query_as::<_, PurchaseLine>(&sql)
            .bind(purchase_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists purchases, newest first.
    pub async fn list(&self) -> DbResult<Vec<Purchase>> {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases ORDER BY date DESC");

        Ok(sqlx::query_as::<_, Purchase>(&sql).fetch_all(&self.pool).await?)
    }

    /// Lists purchases from one supplier, newest first.
    ///
    /// Matching is exact on the stored supplier name.
    pub async fn list_by_supplier(&self, supplier: &str) -> DbResult<Vec<Purchase>> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE supplier = ?1 ORDER BY date DESC"
        );

        Ok(sqlx::query_as::<_, Purchase>(&sql)
            .bind(supplier)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists purchases dated within `[from, to)`, newest first.
    pub async fn list_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Purchase>> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE date >= ?1 AND date < ?2 ORDER BY date DESC"
        );

        Ok(sqlx::query_as::<_, Purchase>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?)
    }
}
