//! # Purchase Service
//!
//! Purchase documents: each line feeds exactly one Purchase ledger movement,
//! so receiving goods and revaluing stock is a single atomic step.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use crate::service::inventory;
use fonda_core::validation::{validate_name, validate_quantity, validate_unit_cost};
use fonda_core::{source, CoreError, Purchase, PurchaseLine, ValidationError};

/// Input for one purchase line.
#[derive(Debug, Clone)]
pub struct PurchaseLineInput {
    pub product_id: String,
    pub quantity: f64,
    pub unit_cost: f64,
}

/// Service for purchase registration.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    pool: SqlitePool,
}

impl PurchaseService {
    /// Creates a new PurchaseService.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseService { pool }
    }

    /// Registers a purchase document and applies every line to the ledger,
    /// all in one transaction.
    ///
    /// The document total is derived: Σ (quantity × unit_cost) over lines.
    /// Any bad line (unknown product, qty ≤ 0, cost < 0) aborts the whole
    /// purchase, ledger writes included.
    pub async fn create_purchase(
        &self,
        supplier: &str,
        date: DateTime<Utc>,
        lines: &[PurchaseLineInput],
    ) -> DbResult<Purchase> {
        validate_name("supplier", supplier).map_err(CoreError::from)?;
        if lines.is_empty() {
            return Err(CoreError::from(ValidationError::EmptyCollection {
                field: "lines".to_string(),
            })
            .into());
        }
        for line in lines {
            validate_quantity("quantity", line.quantity).map_err(CoreError::from)?;
            validate_unit_cost(line.unit_cost).map_err(CoreError::from)?;
        }

        let purchase_id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        // Total filled in after the lines are applied
        sqlx::query("INSERT INTO purchases (id, supplier, date, total) VALUES (?1, ?2, ?3, 0)")
            .bind(&purchase_id)
            .bind(supplier.trim())
            .bind(date)
            .execute(&mut *tx)
            .await?;

        let mut total = 0.0;
        for line in lines {
            let subtotal = line.quantity * line.unit_cost;
            total += subtotal;

            let stored = PurchaseLine {
                id: Uuid::new_v4().to_string(),
                purchase_id: purchase_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                subtotal,
            };

            sqlx::query(
                "INSERT INTO purchase_lines \
                 (id, purchase_id, product_id, quantity, unit_cost, subtotal) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&stored.id)
            .bind(&stored.purchase_id)
            .bind(&stored.product_id)
            .bind(stored.quantity)
            .bind(stored.unit_cost)
            .bind(stored.subtotal)
            .execute(&mut *tx)
            .await?;

            inventory::apply_purchase(
                &mut tx,
                &line.product_id,
                line.quantity,
                line.unit_cost,
                source::PURCHASE,
                &purchase_id,
            )
            .await?;
        }

        sqlx::query("UPDATE purchases SET total = ?1 WHERE id = ?2")
            .bind(total)
            .bind(&purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(supplier, lines = lines.len(), total, "Purchase registered");
        Ok(Purchase {
            id: purchase_id,
            supplier: supplier.trim().to_string(),
            date,
            total,
        })
    }
}
