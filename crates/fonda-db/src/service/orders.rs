//! # Order Service
//!
//! Order lifecycle: creation against a free table, line edits while open,
//! state transitions, and recipe consumption at payment time.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │          create_order          transition            payment path       │
//! │                                                                         │
//! │   Table Free ──► Open ──► Preparation ──► Served ──► Paid               │
//! │   (marks it        │           │             │      (cash service:      │
//! │    Occupied)       └───────────┴─────────────┘       consume + pay +    │
//! │                            Cancelled                 free table)        │
//! │                        (frees the table)                                │
//! │                                                                         │
//! │   Line edits (add/update/remove) are permitted while Open only.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::service::inventory;
use fonda_core::order_flow::check_transition;
use fonda_core::validation::validate_quantity;
use fonda_core::{
    source, CoreError, Dish, Ingredient, MovementKind, Order, OrderLine, OrderStatus, Role,
    TableState,
};

/// Service for order mutations.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

/// Loads an order inside the caller's transaction.
pub(crate) async fn load_order(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Order> {
    sqlx::query_as::<_, Order>(
        "SELECT id, table_id, staff_id, status, total, created_at FROM orders WHERE id = ?1",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| CoreError::not_found("Order", order_id).into())
}

/// Frees the order's table. Missing table is tolerated: the order must not
/// become unpayable because its table was deleted.
pub(crate) async fn free_table(conn: &mut SqliteConnection, table_id: &str) -> DbResult<()> {
    sqlx::query("UPDATE dining_tables SET state = ?1 WHERE id = ?2")
        .bind(TableState::Free)
        .bind(table_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Consumes the recipe ingredients for every line of an order as Sale
/// outputs, inside the caller's transaction.
///
/// Consumption per ingredient is `line.quantity × quantity_per_unit`. An
/// order with no lines is rejected outright, and a dish without a recipe
/// aborts the whole flow: a recipe-less sale would silently corrupt the
/// stock valuation.
pub(crate) async fn consume_for_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    let lines = sqlx::query_as::<_, OrderLine>(
        "SELECT id, order_id, dish_id, quantity, unit_price, subtotal \
         FROM order_lines WHERE order_id = ?1 ORDER BY id",
    )
    .bind(&order.id)
    .fetch_all(&mut *conn)
    .await?;

    if lines.is_empty() {
        return Err(CoreError::EmptyOrder {
            order_id: order.id.clone(),
        }
        .into());
    }

    for line in &lines {
        let dish = sqlx::query_as::<_, Dish>(
            "SELECT id, name, price, is_active, created_at FROM dishes WHERE id = ?1",
        )
        .bind(&line.dish_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| CoreError::not_found("Dish", &line.dish_id))?;

        let recipe = sqlx::query_as::<_, Ingredient>(
            "SELECT id, dish_id, product_id, quantity_per_unit \
             FROM ingredients WHERE dish_id = ?1 ORDER BY product_id",
        )
        .bind(&dish.id)
        .fetch_all(&mut *conn)
        .await?;

        if recipe.is_empty() {
            return Err(CoreError::MissingRecipe { dish: dish.name }.into());
        }

        for ingredient in &recipe {
            let needed = line.quantity * ingredient.quantity_per_unit;
            inventory::apply_output(
                conn,
                &ingredient.product_id,
                MovementKind::Sale,
                needed,
                source::ORDER,
                &order.id,
            )
            .await?;
        }
    }

    debug!(order_id = %order.id, lines = lines.len(), "Order consumption applied");
    Ok(())
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    /// Opens an order against a free table and marks the table Occupied.
    pub async fn create_order(&self, table_id: &str, staff_id: &str) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let table = sqlx::query_as::<_, fonda_core::DiningTable>(
            "SELECT id, number, state FROM dining_tables WHERE id = ?1",
        )
        .bind(table_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("Table", table_id))?;

        if table.state == TableState::Occupied {
            return Err(CoreError::TableOccupied {
                number: table.number,
            }
            .into());
        }

        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            table_id: table.id.clone(),
            staff_id: staff_id.to_string(),
            status: OrderStatus::Open,
            total: 0.0,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO orders (id, table_id, staff_id, status, total, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&order.id)
        .bind(&order.table_id)
        .bind(&order.staff_id)
        .bind(order.status)
        .bind(order.total)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE dining_tables SET state = ?1 WHERE id = ?2")
            .bind(TableState::Occupied)
            .bind(&table.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(order_id = %order.id, table = table.number, "Order created");
        Ok(order)
    }

    /// Adds a line for an active dish, freezing the dish price.
    ///
    /// Open orders only: once the ticket is sent to the kitchen, the lines
    /// are fixed.
    pub async fn add_line(&self, order_id: &str, dish_id: &str, quantity: f64) -> DbResult<OrderLine> {
        validate_quantity("quantity", quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let order = load_order(&mut tx, order_id).await?;
        if order.status != OrderStatus::Open {
            return Err(CoreError::OrderFinalized {
                order_id: order.id,
                status: order.status,
            }
            .into());
        }

        let dish = sqlx::query_as::<_, Dish>(
            "SELECT id, name, price, is_active, created_at FROM dishes WHERE id = ?1",
        )
        .bind(dish_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("Dish", dish_id))?;

        if !dish.is_active {
            return Err(CoreError::inactive("Dish", dish_id).into());
        }

        let line = OrderLine {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            dish_id: dish.id.clone(),
            quantity,
            unit_price: dish.price,
            subtotal: quantity * dish.price,
        };

        sqlx::query(
            "INSERT INTO order_lines (id, order_id, dish_id, quantity, unit_price, subtotal) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(&line.dish_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.subtotal)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE orders SET total = total + ?1 WHERE id = ?2")
            .bind(line.subtotal)
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(order_id, dish = %dish.name, quantity, "Line added");
        Ok(line)
    }

    /// Changes a line's quantity. Open orders only.
    pub async fn update_line(&self, order_id: &str, line_id: &str, quantity: f64) -> DbResult<OrderLine> {
        validate_quantity("quantity", quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let order = load_order(&mut tx, order_id).await?;
        if order.status != OrderStatus::Open {
            return Err(CoreError::OrderFinalized {
                order_id: order.id,
                status: order.status,
            }
            .into());
        }

        let line = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, dish_id, quantity, unit_price, subtotal \
             FROM order_lines WHERE id = ?1 AND order_id = ?2",
        )
        .bind(line_id)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("OrderLine", line_id))?;

        let new_subtotal = quantity * line.unit_price;
        let delta = new_subtotal - line.subtotal;

        sqlx::query("UPDATE order_lines SET quantity = ?1, subtotal = ?2 WHERE id = ?3")
            .bind(quantity)
            .bind(new_subtotal)
            .bind(line_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE orders SET total = total + ?1 WHERE id = ?2")
            .bind(delta)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderLine {
            quantity,
            subtotal: new_subtotal,
            ..line
        })
    }

    /// Removes a line. Open orders only; the total never goes below zero.
    pub async fn remove_line(&self, order_id: &str, line_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let order = load_order(&mut tx, order_id).await?;
        if order.status != OrderStatus::Open {
            return Err(CoreError::OrderFinalized {
                order_id: order.id,
                status: order.status,
            }
            .into());
        }

        let line = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, dish_id, quantity, unit_price, subtotal \
             FROM order_lines WHERE id = ?1 AND order_id = ?2",
        )
        .bind(line_id)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("OrderLine", line_id))?;

        sqlx::query("DELETE FROM order_lines WHERE id = ?1")
            .bind(line_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE orders SET total = MAX(0, total - ?1) WHERE id = ?2")
            .bind(line.subtotal)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Drives an order through the transition table, with role narrowing.
    ///
    /// Paid is never a valid target here; it is reached only through the
    /// payment path in the cash service. Cancelling frees the table.
    pub async fn transition(&self, order_id: &str, next: OrderStatus, role: Role) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let order = load_order(&mut tx, order_id).await?;
        check_transition(&order.id, order.status, next, role)?;

        sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
            .bind(next)
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        if next == OrderStatus::Cancelled {
            free_table(&mut tx, &order.table_id).await?;
        }

        tx.commit().await?;

        info!(order_id, from = ?order.status, to = ?next, "Order transitioned");
        Ok(Order {
            status: next,
            ..order
        })
    }
}
