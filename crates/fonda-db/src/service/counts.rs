//! # Physical Count Service
//!
//! Physical inventory counts: a Draft snapshots the system stock per product;
//! applying it reconciles the ledger to the counted reality.
//!
//! ## One-Way Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   create_draft                       apply                              │
//! │                                                                         │
//! │   Draft ─────────────────────────────► Applied   (never back)           │
//! │                                                                         │
//! │   per line at draft time:         per line at apply time:               │
//! │     system_qty = product.stock      diff > 0 → positive adjustment      │
//! │     difference = counted − system   diff < 0 → negative adj. output     │
//! │                                     diff = 0 → no movement              │
//! │                                                                         │
//! │   Applying twice is rejected: the guard reads the status inside the     │
//! │   same transaction that flips it.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use crate::service::inventory;
use fonda_core::costing::{qty_eq, round_qty};
use fonda_core::{
    source, CoreError, CountLine, CountStatus, CountType, MovementKind, PhysicalCount,
    ValidationError,
};

/// Input for one counted product.
#[derive(Debug, Clone)]
pub struct CountLineInput {
    pub product_id: String,
    pub counted_qty: f64,
}

/// Service for physical counts.
#[derive(Debug, Clone)]
pub struct CountService {
    pool: SqlitePool,
}

impl CountService {
    /// Creates a new CountService.
    pub fn new(pool: SqlitePool) -> Self {
        CountService { pool }
    }

    /// Creates a Draft count, snapshotting each product's system stock.
    ///
    /// Counted quantities may be zero (an empty shelf is a valid count)
    /// but not negative.
    pub async fn create_draft(
        &self,
        kind: CountType,
        date: DateTime<Utc>,
        lines: &[CountLineInput],
    ) -> DbResult<(PhysicalCount, Vec<CountLine>)> {
        if lines.is_empty() {
            return Err(CoreError::from(ValidationError::EmptyCollection {
                field: "lines".to_string(),
            })
            .into());
        }
        for line in lines {
            if !line.counted_qty.is_finite() || line.counted_qty < 0.0 {
                return Err(CoreError::from(ValidationError::MustBeNonNegative {
                    field: "counted_qty".to_string(),
                })
                .into());
            }
        }

        let count = PhysicalCount {
            id: Uuid::new_v4().to_string(),
            kind,
            date,
            status: CountStatus::Draft,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO physical_counts (id, kind, date, status) VALUES (?1, ?2, ?3, ?4)")
            .bind(&count.id)
            .bind(count.kind)
            .bind(count.date)
            .bind(count.status)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(lines.len());
        for line in lines {
            let product = inventory::load_active_product(&mut tx, &line.product_id).await?;

            let counted = round_qty(line.counted_qty);
            let entry = CountLine {
                id: Uuid::new_v4().to_string(),
                count_id: count.id.clone(),
                product_id: product.id.clone(),
                counted_qty: counted,
                system_qty: product.stock,
                difference: round_qty(counted - product.stock),
            };

            sqlx::query(
                "INSERT INTO count_lines \
                 (id, count_id, product_id, counted_qty, system_qty, difference) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&entry.id)
            .bind(&entry.count_id)
            .bind(&entry.product_id)
            .bind(entry.counted_qty)
            .bind(entry.system_qty)
            .bind(entry.difference)
            .execute(&mut *tx)
            .await?;

            stored.push(entry);
        }

        tx.commit().await?;

        info!(count_id = %count.id, kind = ?kind, lines = stored.len(), "Count draft created");
        Ok((count, stored))
    }

    /// Applies a Draft count: one adjustment movement per non-zero
    /// difference, then the one-way flip to Applied.
    pub async fn apply(&self, count_id: &str) -> DbResult<PhysicalCount> {
        let mut tx = self.pool.begin().await?;

        let count = sqlx::query_as::<_, PhysicalCount>(
            "SELECT id, kind, date, status FROM physical_counts WHERE id = ?1",
        )
        .bind(count_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("PhysicalCount", count_id))?;

        if count.status == CountStatus::Applied {
            return Err(CoreError::CountAlreadyApplied {
                count_id: count.id,
            }
            .into());
        }

        let lines = sqlx::query_as::<_, CountLine>(
            "SELECT id, count_id, product_id, counted_qty, system_qty, difference \
             FROM count_lines WHERE count_id = ?1 ORDER BY id",
        )
        .bind(count_id)
        .fetch_all(&mut *tx)
        .await?;

        for line in &lines {
            if qty_eq(line.difference, 0.0) {
                continue;
            }
            if line.difference > 0.0 {
                inventory::apply_positive_adjustment(
                    &mut tx,
                    &line.product_id,
                    line.difference,
                    source::PHYSICAL_COUNT,
                    count_id,
                )
                .await?;
            } else {
                inventory::apply_output(
                    &mut tx,
                    &line.product_id,
                    MovementKind::NegativeAdjustment,
                    line.difference.abs(),
                    source::PHYSICAL_COUNT,
                    count_id,
                )
                .await?;
            }
        }

        sqlx::query("UPDATE physical_counts SET status = ?1 WHERE id = ?2")
            .bind(CountStatus::Applied)
            .bind(count_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(count_id, lines = lines.len(), "Count applied");
        Ok(PhysicalCount {
            status: CountStatus::Applied,
            ..count
        })
    }
}
