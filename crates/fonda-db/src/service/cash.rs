//! # Cash Session Service
//!
//! The cash register: one open session at a time, payments against served
//! orders, and an immutable closing summary per session.
//!
//! ## The Payment Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_payment(order, method)                                        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. session must be Open          (NoOpenSession)                     │
//! │    2. order must be exactly Served  (OrderNotServed / OrderFinalized)   │
//! │    3. no prior payment              (DuplicatePayment + UNIQUE index)   │
//! │    4. consume recipes per line      (Sale outputs; MissingRecipe or     │
//! │                                      InsufficientStock abort here)      │
//! │    5. INSERT payment (amount = order.total)                             │
//! │    6. order → Paid                                                      │
//! │    7. table → Free                                                      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure in 1-7 rolls back everything: no payment without           │
//! │  consumption, no consumption without payment.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use crate::service::orders::{consume_for_order, free_table, load_order};
use fonda_core::validation::validate_opening_float;
use fonda_core::{
    CashSession, ClosingSummary, ClosingTotals, CoreError, OrderStatus, Payment, PaymentMethod,
    SessionStatus,
};

/// The open session together with its running payment totals.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session: CashSession,
    pub payments: Vec<Payment>,
    pub totals: ClosingTotals,
}

/// Service for cash sessions, payments, and closing.
#[derive(Debug, Clone)]
pub struct CashService {
    pool: SqlitePool,
}

/// Loads the open session inside the caller's transaction, if any.
async fn open_session_in_tx(conn: &mut SqliteConnection) -> DbResult<Option<CashSession>> {
    Ok(sqlx::query_as::<_, CashSession>(
        "SELECT id, staff_id, opening_float, status, opened_at \
         FROM cash_sessions WHERE status = 'open'",
    )
    .fetch_optional(&mut *conn)
    .await?)
}

impl CashService {
    /// Creates a new CashService.
    pub fn new(pool: SqlitePool) -> Self {
        CashService { pool }
    }

    /// Opens a cash session with the given opening float.
    ///
    /// At most one session may be Open: checked inside the transaction and
    /// backed by the partial unique index on `status = 'open'`.
    pub async fn open_session(&self, staff_id: &str, opening_float: f64) -> DbResult<CashSession> {
        validate_opening_float(opening_float).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        if open_session_in_tx(&mut tx).await?.is_some() {
            return Err(CoreError::SessionAlreadyOpen.into());
        }

        let session = CashSession {
            id: Uuid::new_v4().to_string(),
            staff_id: staff_id.to_string(),
            opening_float,
            status: SessionStatus::Open,
            opened_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO cash_sessions (id, staff_id, opening_float, status, opened_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&session.id)
        .bind(&session.staff_id)
        .bind(session.opening_float)
        .bind(session.status)
        .bind(session.opened_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(session_id = %session.id, opening_float, "Cash session opened");
        Ok(session)
    }

    /// Returns the open session with its payments and running totals, or
    /// `None` when the register is closed.
    pub async fn session_status(&self) -> DbResult<Option<SessionReport>> {
        let session = sqlx::query_as::<_, CashSession>(
            "SELECT id, staff_id, opening_float, status, opened_at \
             FROM cash_sessions WHERE status = 'open'",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        let payments = sqlx::query_as::<_, Payment>(
            "SELECT id, order_id, session_id, method, amount, paid_at \
             FROM payments WHERE session_id = ?1 ORDER BY paid_at",
        )
        .bind(&session.id)
        .fetch_all(&self.pool)
        .await?;

        let totals = ClosingTotals::from_payments(&payments);
        Ok(Some(SessionReport {
            session,
            payments,
            totals,
        }))
    }

    /// Pays a served order: consumes its recipes, records the payment, marks
    /// the order Paid, and frees the table. One transaction, one payment per
    /// order ever.
    pub async fn register_payment(
        &self,
        order_id: &str,
        method: PaymentMethod,
    ) -> DbResult<Payment> {
        let mut tx = self.pool.begin().await?;

        let session = open_session_in_tx(&mut tx)
            .await?
            .ok_or(CoreError::NoOpenSession)?;

        let order = load_order(&mut tx, order_id).await?;
        match order.status {
            OrderStatus::Served => {}
            OrderStatus::Paid => {
                return Err(CoreError::DuplicatePayment {
                    order_id: order.id,
                }
                .into())
            }
            status => {
                return Err(CoreError::OrderNotServed {
                    order_id: order.id,
                    status,
                }
                .into())
            }
        }

        let prior: Option<(String,)> =
            sqlx::query_as("SELECT id FROM payments WHERE order_id = ?1")
                .bind(&order.id)
                .fetch_optional(&mut *tx)
                .await?;
        if prior.is_some() {
            return Err(CoreError::DuplicatePayment {
                order_id: order.id,
            }
            .into());
        }

        consume_for_order(&mut tx, &order).await?;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            session_id: session.id.clone(),
            method,
            amount: order.total,
            paid_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO payments (id, order_id, session_id, method, amount, paid_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(&payment.session_id)
        .bind(payment.method)
        .bind(payment.amount)
        .bind(payment.paid_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
            .bind(OrderStatus::Paid)
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        free_table(&mut tx, &order.table_id).await?;

        tx.commit().await?;

        info!(
            order_id,
            amount = payment.amount,
            method = ?method,
            "Payment registered"
        );
        Ok(payment)
    }

    /// Closes a session: blocked while the period still has unresolved
    /// orders, then persists the immutable per-method totals.
    pub async fn close_session(&self, session_id: &str) -> DbResult<ClosingSummary> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, CashSession>(
            "SELECT id, staff_id, opening_float, status, opened_at \
             FROM cash_sessions WHERE id = ?1",
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("CashSession", session_id))?;

        if session.status == SessionStatus::Closed {
            return Err(CoreError::SessionClosed {
                session_id: session.id,
            }
            .into());
        }

        // Orders from this session's period must all be settled before the
        // drawer can be reconciled
        let (pending,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM orders \
             WHERE created_at >= ?1 AND status IN ('open', 'preparation', 'served')",
        )
        .bind(session.opened_at)
        .fetch_one(&mut *tx)
        .await?;

        if pending > 0 {
            return Err(CoreError::UnsettledOrders { pending }.into());
        }

        let payments = sqlx::query_as::<_, Payment>(
            "SELECT id, order_id, session_id, method, amount, paid_at \
             FROM payments WHERE session_id = ?1 ORDER BY paid_at",
        )
        .bind(&session.id)
        .fetch_all(&mut *tx)
        .await?;

        let totals = ClosingTotals::from_payments(&payments);
        let summary = ClosingSummary {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            total_sales: totals.total,
            total_cash: totals.cash,
            total_card: totals.card,
            total_transfer: totals.transfer,
            closed_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO closing_summaries \
             (id, session_id, total_sales, total_cash, total_card, total_transfer, closed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&summary.id)
        .bind(&summary.session_id)
        .bind(summary.total_sales)
        .bind(summary.total_cash)
        .bind(summary.total_card)
        .bind(summary.total_transfer)
        .bind(summary.closed_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE cash_sessions SET status = ?1 WHERE id = ?2")
            .bind(SessionStatus::Closed)
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            session_id,
            total_sales = summary.total_sales,
            payments = payments.len(),
            "Cash session closed"
        );
        Ok(summary)
    }
}
