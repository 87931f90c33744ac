//! # Dining Table Repository
//!
//! Read access for dining tables.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use fonda_core::{DiningTable, TableState};

/// Repository for dining table reads.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Gets a table by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<DiningTable> {
        sqlx::query_as::<_, DiningTable>(
            "SELECT id, number, state FROM dining_tables WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Table", id))
    }

    /// Gets a table by its public number.
    pub async fn get_by_number(&self, number: i64) -> DbResult<DiningTable> {
        sqlx::query_as::<_, DiningTable>(
            "SELECT id, number, state FROM dining_tables WHERE number = ?1",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Table", number.to_string()))
    }

    /// Lists all tables sorted by number.
    pub async fn list(&self) -> DbResult<Vec<DiningTable>> {
        Ok(sqlx::query_as::<_, DiningTable>(
            "SELECT id, number, state FROM dining_tables ORDER BY number",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Lists tables in the given state, sorted by number.
    pub async fn list_by_state(&self, state: TableState) -> DbResult<Vec<DiningTable>> {
        Ok(sqlx::query_as::<_, DiningTable>(
            "SELECT id, number, state FROM dining_tables WHERE state = ?1 ORDER BY number",
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await?)
    }
}
