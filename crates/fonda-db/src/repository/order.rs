//! # Order Repository
//!
//! Read access for orders and order lines.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use fonda_core::{Order, OrderLine, OrderStatus};

/// Repository for order reads and listings.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

const ORDER_COLUMNS: &str = "id, table_id, staff_id, status, total, created_at";

const LINE_COLUMNS: &str = "id, order_id, dish_id, quantity, unit_price, subtotal";

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Returns the lines of an order.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY id");

        Ok(sqlx::query_as::<_, OrderLine>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists orders in a given status, newest first.
    pub async fn list_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 ORDER BY created_at DESC"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        debug!(status = ?status, count = orders.len(), "Listed orders by status");
        Ok(orders)
    }

    /// Lists orders created within `[from, to)`, newest first.
    pub async fn list_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE created_at >= ?1 AND created_at < ?2 ORDER BY created_at DESC"
        );

        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists orders that are still in play (not paid, not cancelled),
    /// oldest first so the kitchen sees them in arrival order.
    pub async fn list_active(&self) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE status IN ('open', 'preparation', 'served') ORDER BY created_at"
        );

        Ok(sqlx::query_as::<_, Order>(&sql).fetch_all(&self.pool).await?)
    }

    /// Returns the active (non-terminal) order for a table, if any.
    ///
    /// The occupancy rule means there is at most one.
    pub async fn active_for_table(&self, table_id: &str) -> DbResult<Option<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE table_id = ?1 AND status IN ('open', 'preparation', 'served') \
             ORDER BY created_at DESC LIMIT 1"
        );

        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(table_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}
