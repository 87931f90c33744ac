//! # Physical Count Repository
//!
//! Read access for physical counts and their lines.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use fonda_core::{CountLine, CountStatus, CountType, PhysicalCount};

/// Repository for physical count reads.
#[derive(Debug, Clone)]
pub struct CountRepository {
    pool: SqlitePool,
}

const COUNT_COLUMNS: &str = "id, kind, date, status";

const LINE_COLUMNS: &str = "id, count_id, product_id, counted_qty, system_qty, difference";

impl CountRepository {
    /// Creates a new CountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CountRepository { pool }
    }

    /// Gets a physical count by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<PhysicalCount> {
        let sql = format!("SELECT {COUNT_COLUMNS} FROM physical_counts WHERE id = ?1");

        sqlx::query_as::<_, PhysicalCount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("PhysicalCount", id))
    }

    /// Returns the lines of a count.
    pub async fn lines(&self, count_id: &str) -> DbResult<Vec<CountLine>> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM count_lines WHERE count_id = ?1 ORDER BY id");

        Ok(sqlx::query_as::<_, CountLine>(&sql)
            .bind(count_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists counts, newest first.
    pub async fn list(&self) -> DbResult<Vec<PhysicalCount>> {
        let sql = format!("SELECT {COUNT_COLUMNS} FROM physical_counts ORDER BY date DESC");

        Ok(sqlx::query_as::<_, PhysicalCount>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists counts filtered by status, newest first.
    pub async fn list_by_status(&self, status: CountStatus) -> DbResult<Vec<PhysicalCount>> {
        let sql = format!(
            "SELECT {COUNT_COLUMNS} FROM physical_counts WHERE status = ?1 ORDER BY date DESC"
        );

        Ok(sqlx::query_as::<_, PhysicalCount>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists counts filtered by kind, newest first.
    pub async fn list_by_kind(&self, kind: CountType) -> DbResult<Vec<PhysicalCount>> {
        let sql = format!(
            "SELECT {COUNT_COLUMNS} FROM physical_counts WHERE kind = ?1 ORDER BY date DESC"
        );

        Ok(sqlx::query_as::<_, PhysicalCount>(&sql)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?)
    }
}
