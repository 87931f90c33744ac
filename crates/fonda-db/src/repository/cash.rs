//! # Cash Session Repository
//!
//! Read access for cash sessions, payments, and closing summaries.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use fonda_core::{CashSession, ClosingSummary, Payment};

/// Repository for cash session reads.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

const SESSION_COLUMNS: &str = "id, staff_id, opening_float, status, opened_at";

const PAYMENT_COLUMNS: &str = "id, order_id, session_id, method, amount, paid_at";

const SUMMARY_COLUMNS: &str =
    "id, session_id, total_sales, total_cash, total_card, total_transfer, closed_at";

impl CashRepository {
    /// Creates a new CashRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<CashSession> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE id = ?1");

        sqlx::query_as::<_, CashSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("CashSession", id))
    }

    /// Returns the currently open session, if any.
    ///
    /// The partial unique index on (status='open') guarantees at most one.
    pub async fn open_session(&self) -> DbResult<Option<CashSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE status = 'open'");

        Ok(sqlx::query_as::<_, CashSession>(&sql)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Lists sessions, newest first.
    pub async fn list(&self) -> DbResult<Vec<CashSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM cash_sessions ORDER BY opened_at DESC");

        Ok(sqlx::query_as::<_, CashSession>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Returns the payments registered under a session, oldest first.
    pub async fn payments(&self, session_id: &str) -> DbResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE session_id = ?1 ORDER BY paid_at"
        );

        Ok(sqlx::query_as::<_, Payment>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Returns the payment for an order, if it has one.
    pub async fn payment_for_order(&self, order_id: &str) -> DbResult<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ?1");

        Ok(sqlx::query_as::<_, Payment>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Returns the closing summary for a session, if it was closed.
    pub async fn closing_summary(&self, session_id: &str) -> DbResult<Option<ClosingSummary>> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM closing_summaries WHERE session_id = ?1");

        Ok(sqlx::query_as::<_, ClosingSummary>(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}
