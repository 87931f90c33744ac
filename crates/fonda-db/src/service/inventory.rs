//! # Inventory Ledger Service
//!
//! The stock ledger: every quantity change flows through here.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Weighted-Average Costing                             │
//! │                                                                         │
//! │  PURCHASE (inflow)                                                      │
//! │    stock' = stock + qty                                                 │
//! │    avg'   = (stock × avg + qty × unit_cost) / (stock + qty)             │
//! │                                                                         │
//! │  OUTPUT (sale / waste / negative adjustment)                            │
//! │    stock' = stock − qty          (rejected if it would go negative)     │
//! │    avg'   = avg                  (outflows never move the average)      │
//! │    movement.quantity = −qty, movement.unit_cost = avg                   │
//! │                                                                         │
//! │  POSITIVE ADJUSTMENT (count overage)                                    │
//! │    stock' = stock + qty                                                 │
//! │    avg'   = avg                  (found stock is already-owned stock,   │
//! │                                   not a new purchase)                   │
//! │                                                                         │
//! │  Every persisted number is rounded to 6 decimals first.                 │
//! │  Every movement row carries (resulting_stock, resulting_avg_cost):      │
//! │  the last row per product must always equal the product snapshot.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `apply_*` helpers take `&mut SqliteConnection` and run inside the
//! caller's transaction; the `register_*` wrappers open and commit their own.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use fonda_core::costing::{qty_eq, round_qty, weighted_average};
use fonda_core::validation::{validate_quantity, validate_unit_cost};
use fonda_core::{CoreError, Movement, MovementKind, Product};

// =============================================================================
// In-Transaction Helpers
// =============================================================================

/// Loads a product inside the caller's transaction, requiring it to exist
/// and be active.
pub(crate) async fn load_active_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Product> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, unit, stock, avg_cost, is_active, created_at, updated_at \
         FROM products WHERE id = ?1",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| CoreError::not_found("Product", product_id))?;

    if !product.is_active {
        return Err(CoreError::inactive("Product", product_id).into());
    }
    Ok(product)
}

/// Writes the product snapshot and appends the movement row.
///
/// `quantity` is already signed; `new_stock`/`new_avg` are already rounded.
async fn write_movement(
    conn: &mut SqliteConnection,
    product: &Product,
    kind: MovementKind,
    quantity: f64,
    unit_cost: f64,
    new_stock: f64,
    new_avg: f64,
    source_type: &str,
    source_id: &str,
) -> DbResult<Movement> {
    let now = Utc::now();

    sqlx::query("UPDATE products SET stock = ?1, avg_cost = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(new_stock)
        .bind(new_avg)
        .bind(now)
        .bind(&product.id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query(
        "INSERT INTO movements \
         (product_id, kind, source_type, source_id, quantity, unit_cost, \
          resulting_stock, resulting_avg_cost, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&product.id)
    .bind(kind)
    .bind(source_type)
    .bind(source_id)
    .bind(quantity)
    .bind(unit_cost)
    .bind(new_stock)
    .bind(new_avg)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    debug!(
        product = %product.name,
        kind = ?kind,
        quantity,
        resulting_stock = new_stock,
        "Ledger movement written"
    );

    Ok(Movement {
        id: result.last_insert_rowid(),
        product_id: product.id.clone(),
        kind,
        source_type: source_type.to_string(),
        source_id: source_id.to_string(),
        quantity,
        unit_cost,
        resulting_stock: new_stock,
        resulting_avg_cost: new_avg,
        created_at: now,
    })
}

/// Registers a purchase inflow: stock grows and the weighted-average cost is
/// recomputed.
pub(crate) async fn apply_purchase(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: f64,
    unit_cost: f64,
    source_type: &str,
    source_id: &str,
) -> DbResult<Movement> {
    validate_quantity("quantity", quantity).map_err(CoreError::from)?;
    validate_unit_cost(unit_cost).map_err(CoreError::from)?;

    let product = load_active_product(conn, product_id).await?;

    let quantity = round_qty(quantity);
    let unit_cost = round_qty(unit_cost);
    let new_stock = round_qty(product.stock + quantity);
    let new_avg = round_qty(weighted_average(
        product.stock,
        product.avg_cost,
        quantity,
        unit_cost,
    ));

    write_movement(
        conn,
        &product,
        MovementKind::Purchase,
        quantity,
        unit_cost,
        new_stock,
        new_avg,
        source_type,
        source_id,
    )
    .await
}

/// Registers an outflow (sale, waste, or negative adjustment).
///
/// Fails with `InsufficientStock` if the product cannot cover the quantity.
/// The average cost never moves on an outflow; the movement records the
/// current average as its unit cost and stores the quantity negated.
pub(crate) async fn apply_output(
    conn: &mut SqliteConnection,
    product_id: &str,
    kind: MovementKind,
    quantity: f64,
    source_type: &str,
    source_id: &str,
) -> DbResult<Movement> {
    debug_assert!(kind.is_outflow(), "apply_output called with inflow kind");
    validate_quantity("quantity", quantity).map_err(CoreError::from)?;

    let product = load_active_product(conn, product_id).await?;

    let quantity = round_qty(quantity);
    if !product.has_stock_for(quantity) {
        return Err(CoreError::InsufficientStock {
            product: product.name,
            available: product.stock,
            requested: quantity,
        }
        .into());
    }

    // Clamp to exactly zero when the remainder is below ledger precision
    let remainder = round_qty(product.stock - quantity);
    let new_stock = if qty_eq(remainder, 0.0) { 0.0 } else { remainder };

    write_movement(
        conn,
        &product,
        kind,
        -quantity,
        product.avg_cost,
        new_stock,
        product.avg_cost,
        source_type,
        source_id,
    )
    .await
}

/// Registers a positive adjustment (count overage): stock grows but the
/// average cost is deliberately left untouched.
pub(crate) async fn apply_positive_adjustment(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: f64,
    source_type: &str,
    source_id: &str,
) -> DbResult<Movement> {
    validate_quantity("quantity", quantity).map_err(CoreError::from)?;

    let product = load_active_product(conn, product_id).await?;

    let quantity = round_qty(quantity);
    let new_stock = round_qty(product.stock + quantity);

    write_movement(
        conn,
        &product,
        MovementKind::PositiveAdjustment,
        quantity,
        product.avg_cost,
        new_stock,
        product.avg_cost,
        source_type,
        source_id,
    )
    .await
}

// =============================================================================
// Inventory Service
// =============================================================================

/// Public entry points for ledger operations.
///
/// Each `register_*` method runs in its own transaction. Flows that write the
/// ledger alongside other documents (purchases, counts, payments) use the
/// `apply_*` helpers directly inside their own transactions.
#[derive(Debug, Clone)]
pub struct InventoryService {
    pool: SqlitePool,
}

impl InventoryService {
    /// Creates a new InventoryService.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryService { pool }
    }

    /// Registers a standalone purchase inflow for one product.
    pub async fn register_purchase(
        &self,
        product_id: &str,
        quantity: f64,
        unit_cost: f64,
        source_type: &str,
        source_id: &str,
    ) -> DbResult<Movement> {
        let mut tx = self.pool.begin().await?;
        let movement = apply_purchase(
            &mut tx, product_id, quantity, unit_cost, source_type, source_id,
        )
        .await?;
        tx.commit().await?;

        info!(product_id, quantity, "Purchase registered");
        Ok(movement)
    }

    /// Registers a standalone outflow for one product.
    pub async fn register_output(
        &self,
        product_id: &str,
        kind: MovementKind,
        quantity: f64,
        source_type: &str,
        source_id: &str,
    ) -> DbResult<Movement> {
        let mut tx = self.pool.begin().await?;
        let movement =
            apply_output(&mut tx, product_id, kind, quantity, source_type, source_id).await?;
        tx.commit().await?;

        info!(product_id, quantity, kind = ?kind, "Output registered");
        Ok(movement)
    }

    /// Registers a standalone positive adjustment for one product.
    pub async fn register_positive_adjustment(
        &self,
        product_id: &str,
        quantity: f64,
        source_type: &str,
        source_id: &str,
    ) -> DbResult<Movement> {
        let mut tx = self.pool.begin().await?;
        let movement =
            apply_positive_adjustment(&mut tx, product_id, quantity, source_type, source_id)
                .await?;
        tx.commit().await?;

        info!(product_id, quantity, "Positive adjustment registered");
        Ok(movement)
    }

    /// Returns the product snapshot together with its full movement history.
    pub async fn kardex(&self, product_id: &str) -> DbResult<(Product, Vec<Movement>)> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, unit, stock, avg_cost, is_active, created_at, updated_at \
             FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let movements = sqlx::query_as::<_, Movement>(
            "SELECT id, product_id, kind, source_type, source_id, quantity, unit_cost, \
             resulting_stock, resulting_avg_cost, created_at \
             FROM movements WHERE product_id = ?1 ORDER BY id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((product, movements))
    }

    /// Verifies that the last movement's resulting balance matches the
    /// product snapshot, at ledger precision.
    ///
    /// A product with no movements is trivially consistent. Run after seeding
    /// or bulk operations, not on the hot path.
    pub async fn assert_consistency(&self, product_id: &str) -> DbResult<()> {
        let (product, movements) = self.kardex(product_id).await?;

        if let Some(last) = movements.last() {
            if !qty_eq(last.resulting_stock, product.stock) {
                return Err(CoreError::LedgerInconsistency {
                    product: product.name,
                    ledger: last.resulting_stock,
                    snapshot: product.stock,
                }
                .into());
            }
        }
        Ok(())
    }
}
