//! # Staff Repository
//!
//! Read and minimal write access for staff.
//!
//! Identity only: authentication and credentials live in the boundary layer,
//! outside this schema. Orders and cash sessions reference staff by id, and
//! role gates in the order flow read the role stored here.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use fonda_core::{CoreError, Role, Staff, ValidationError};

/// Repository for staff lookups.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

const STAFF_COLUMNS: &str = "id, username, role, is_active, created_at";

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Gets a staff member by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Staff> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = ?1");

        sqlx::query_as::<_, Staff>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Staff", id))
    }

    /// Gets a staff member by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<Staff>> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE username = ?1");

        Ok(sqlx::query_as::<_, Staff>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Lists active staff sorted by username.
    pub async fn list_active(&self) -> DbResult<Vec<Staff>> {
        let sql =
            format!("SELECT {STAFF_COLUMNS} FROM staff WHERE is_active = 1 ORDER BY username");

        Ok(sqlx::query_as::<_, Staff>(&sql).fetch_all(&self.pool).await?)
    }

    /// Creates a staff member.
    pub async fn create(&self, username: &str, role: Role) -> DbResult<Staff> {
        let staff = Staff {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
        };

        if staff.username.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "username".to_string(),
            })
            .into());
        }

        sqlx::query(
            "INSERT INTO staff (id, username, role, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&staff.id)
        .bind(&staff.username)
        .bind(staff.role)
        .bind(staff.is_active)
        .bind(staff.created_at)
        .execute(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Deactivates a staff member. Historical orders keep referencing them.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE staff SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Staff", id));
        }
        Ok(())
    }
}
