//! # Domain Types
//!
//! Core domain types used throughout Fonda POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────┐   ┌───────────────┐   ┌────────────────┐            │
//! │  │   Product     │   │   Movement    │   │     Dish       │            │
//! │  │ ───────────── │   │ ───────────── │   │ ────────────── │            │
//! │  │ id (UUID)     │◄──│ product_id    │   │ id (UUID)      │            │
//! │  │ stock         │   │ kind          │   │ price          │            │
//! │  │ avg_cost      │   │ quantity (±)  │   │ Ingredient[] ──┼──► Product │
//! │  └───────────────┘   │ resulting_*   │   └────────────────┘            │
//! │                      └───────────────┘                                 │
//! │                                                                         │
//! │  ┌───────────────┐   ┌───────────────┐   ┌────────────────┐            │
//! │  │ DiningTable   │◄──│    Order      │──►│  OrderLine     │            │
//! │  └───────────────┘   │ status        │   │ frozen price   │            │
//! │                      └───────┬───────┘   └────────────────┘            │
//! │                              │ paid via                                │
//! │  ┌───────────────┐   ┌───────▼───────┐   ┌────────────────┐            │
//! │  │ CashSession   │◄──│   Payment     │   │ ClosingSummary │            │
//! │  └───────────────┘   └───────────────┘   └────────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Entities carry UUID v4 string ids. The one exception is `Movement`, whose
//! id is a monotonically increasing i64 sequence: the ledger needs a total
//! order among movements written inside the same transaction (and therefore
//! the same timestamp), which random UUIDs cannot provide.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::costing::qty_eq;

// =============================================================================
// Unit of Measure
// =============================================================================

/// Unit of measure for raw products — a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    /// Mass in kilograms.
    Kg,
    /// Mass in grams.
    G,
    /// Volume in liters.
    Lt,
    /// Volume in milliliters.
    Ml,
    /// Discrete count.
    Unit,
}

impl UnitOfMeasure {
    /// Parses a unit from user input, accepting common aliases.
    ///
    /// ## Accepted Aliases
    /// `kilo`/`kilos` → Kg, `l`/`litro`/`litros` → Lt, `u`/`unidad` → Unit
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "kg" | "kilo" | "kilos" => Some(UnitOfMeasure::Kg),
            "g" => Some(UnitOfMeasure::G),
            "lt" | "l" | "litro" | "litros" => Some(UnitOfMeasure::Lt),
            "ml" => Some(UnitOfMeasure::Ml),
            "unit" | "u" | "unidad" => Some(UnitOfMeasure::Unit),
            _ => None,
        }
    }

    /// Canonical lowercase form, as persisted.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kg => "kg",
            UnitOfMeasure::G => "g",
            UnitOfMeasure::Lt => "lt",
            UnitOfMeasure::Ml => "ml",
            UnitOfMeasure::Unit => "unit",
        }
    }
}

// =============================================================================
// Staff & Roles
// =============================================================================

/// Staff roles. Used by the order state machine's role narrowing and by the
/// boundary layer's authorization checks (out of scope here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access.
    Admin,
    /// Operates the cash register; drives no order transitions directly.
    Cashier,
    /// Takes orders; may send to preparation or cancel.
    Waiter,
    /// Prepares dishes; may mark served.
    Kitchen,
}

/// A staff member. Identity context only; credentials and token issuance live
/// in the excluded auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A raw product tracked by the inventory ledger.
///
/// `stock` and `avg_cost` are mutated only by ledger operations; the snapshot
/// they form must always match the latest movement's resulting balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Unit of measure (fixed enumerated set).
    pub unit: UnitOfMeasure,

    /// Current stock quantity. Invariant: never negative.
    pub stock: f64,

    /// Current weighted-average unit cost. Invariant: never negative.
    pub avg_cost: f64,

    /// Whether the product participates in operations (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether an outflow of `quantity` would keep stock non-negative.
    pub fn has_stock_for(&self, quantity: f64) -> bool {
        self.stock - quantity >= 0.0 || qty_eq(self.stock, quantity)
    }
}

// =============================================================================
// Movement (ledger entry)
// =============================================================================

/// The kind of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Inflow from a purchase; recomputes the weighted-average cost.
    Purchase,
    /// Outflow from recipe consumption on payment.
    Sale,
    /// Outflow from spoilage or loss.
    Waste,
    /// Inflow from a physical-count overage; average cost unchanged.
    PositiveAdjustment,
    /// Outflow from a physical-count shortage.
    NegativeAdjustment,
}

impl MovementKind {
    /// Whether this kind removes stock.
    pub const fn is_outflow(&self) -> bool {
        matches!(
            self,
            MovementKind::Sale | MovementKind::Waste | MovementKind::NegativeAdjustment
        )
    }
}

/// An append-only inventory ledger entry. Immutable once created.
///
/// Each movement carries the post-transaction balance (`resulting_stock`) and
/// the weighted-average cost in force after it (`resulting_avg_cost`), so the
/// ledger doubles as an audit trail of the product snapshot over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    /// Ledger sequence number (total order per database).
    pub id: i64,

    pub product_id: String,

    pub kind: MovementKind,

    /// Source document type for traceability (see [`source`]).
    pub source_type: String,

    /// Source document id.
    pub source_id: String,

    /// Signed quantity: positive for inflows, negative for outflows.
    pub quantity: f64,

    /// Unit cost at the time of the movement. For outflows and positive
    /// adjustments this is the current average cost.
    pub unit_cost: f64,

    /// Stock balance after this movement.
    pub resulting_stock: f64,

    /// Weighted-average cost after this movement.
    pub resulting_avg_cost: f64,

    pub created_at: DateTime<Utc>,
}

/// Source-document type tags recorded on movements.
pub mod source {
    /// A purchase document line.
    pub const PURCHASE: &str = "PURCHASE";
    /// Recipe consumption triggered by paying an order.
    pub const ORDER: &str = "ORDER";
    /// A physical-count adjustment.
    pub const PHYSICAL_COUNT: &str = "PHYSICAL_COUNT";
    /// Opening balance registered at product creation.
    pub const PRODUCT_INITIAL: &str = "PRODUCT_INITIAL";
}

// =============================================================================
// Dish & Recipe
// =============================================================================

/// A sellable dish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Dish {
    pub id: String,
    pub name: String,
    /// Sale price, strictly positive.
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One recipe entry: how much of a product one unit of the dish consumes.
///
/// A dish may have no ingredients at creation (recipe pending), but it cannot
/// be paid for until the recipe exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ingredient {
    pub id: String,
    pub dish_id: String,
    pub product_id: String,
    /// Quantity consumed per unit of the dish, strictly positive.
    pub quantity_per_unit: f64,
}

// =============================================================================
// Dining Table
// =============================================================================

/// The state of a dining table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TableState {
    Free,
    Occupied,
}

/// A dining table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: String,
    /// Human-facing table number, unique.
    pub number: i64,
    pub state: TableState,
}

// =============================================================================
// Order
// =============================================================================

/// The lifecycle state of an order. See [`crate::order_flow`] for the
/// transition table and role narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Taking lines; the only state allowing line edits.
    Open,
    /// Sent to the kitchen.
    Preparation,
    /// Delivered to the table; the only state allowing payment.
    Served,
    /// Paid and consumed. Terminal. Reached only via the payment path.
    Paid,
    /// Cancelled. Terminal. Frees the table.
    Cancelled,
}

/// An order against a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub table_id: String,
    /// Staff member who created the order.
    pub staff_id: String,
    pub status: OrderStatus,
    /// Running total: sum of line subtotals, maintained incrementally.
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

/// A line on an order.
///
/// Uses the snapshot pattern: `unit_price` is frozen from the dish's price at
/// add time, so later dish price changes never retroactively affect lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub dish_id: String,
    /// Strictly positive.
    pub quantity: f64,
    /// Dish price at add time (frozen).
    pub unit_price: f64,
    /// quantity × unit_price.
    pub subtotal: f64,
}

// =============================================================================
// Purchase
// =============================================================================

/// A purchase document. `total` is derived: the sum of line subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub supplier: String,
    pub date: DateTime<Utc>,
    pub total: f64,
}

/// A purchase line; each one feeds exactly one Purchase ledger movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLine {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub subtotal: f64,
}

// =============================================================================
// Physical Count
// =============================================================================

/// Why the count was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CountType {
    Initial,
    Monthly,
    Annual,
}

/// Physical count lifecycle: Draft → Applied, one way only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CountStatus {
    Draft,
    Applied,
}

/// A physical inventory count document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PhysicalCount {
    pub id: String,
    pub kind: CountType,
    pub date: DateTime<Utc>,
    pub status: CountStatus,
}

/// One counted product within a physical count.
///
/// `system_qty` is snapshotted at draft creation; `difference` is
/// counted − system and drives the adjustment on apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CountLine {
    pub id: String,
    pub count_id: String,
    pub product_id: String,
    pub counted_qty: f64,
    pub system_qty: f64,
    pub difference: f64,
}

// =============================================================================
// Cash Session
// =============================================================================

/// Cash session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// A cash register session. At most one may be Open at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashSession {
    pub id: String,
    /// Staff member who opened the session.
    pub staff_id: String,
    /// Opening float amount, non-negative.
    pub opening_float: f64,
    pub status: SessionStatus,
    pub opened_at: DateTime<Utc>,
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

/// A payment against a served order. One per order, ever.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    /// Unique: an order can be paid at most once.
    pub order_id: String,
    pub session_id: String,
    pub method: PaymentMethod,
    /// Equals the order total at payment time.
    pub amount: f64,
    pub paid_at: DateTime<Utc>,
}

/// Closing totals of a cash session, computed once at close and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ClosingSummary {
    pub id: String,
    /// Unique: one summary per session.
    pub session_id: String,
    pub total_sales: f64,
    pub total_cash: f64,
    pub total_card: f64,
    pub total_transfer: f64,
    pub closed_at: DateTime<Utc>,
}

/// Per-method payment totals; pure aggregation used by session close.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClosingTotals {
    pub total: f64,
    pub cash: f64,
    pub card: f64,
    pub transfer: f64,
}

impl ClosingTotals {
    /// Sums payments grouped by method.
    pub fn from_payments(payments: &[Payment]) -> Self {
        let mut totals = ClosingTotals::default();
        for p in payments {
            match p.method {
                PaymentMethod::Cash => totals.cash += p.amount,
                PaymentMethod::Card => totals.card += p.amount,
                PaymentMethod::Transfer => totals.transfer += p.amount,
            }
            totals.total += p.amount;
        }
        totals
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_unit_parse_aliases() {
        assert_eq!(UnitOfMeasure::parse("kg"), Some(UnitOfMeasure::Kg));
        assert_eq!(UnitOfMeasure::parse("Kilos"), Some(UnitOfMeasure::Kg));
        assert_eq!(UnitOfMeasure::parse("l"), Some(UnitOfMeasure::Lt));
        assert_eq!(UnitOfMeasure::parse("litros"), Some(UnitOfMeasure::Lt));
        assert_eq!(UnitOfMeasure::parse("u"), Some(UnitOfMeasure::Unit));
        assert_eq!(UnitOfMeasure::parse("unidad"), Some(UnitOfMeasure::Unit));
        assert_eq!(UnitOfMeasure::parse("gallon"), None);
    }

    #[test]
    fn test_movement_kind_outflow() {
        assert!(MovementKind::Sale.is_outflow());
        assert!(MovementKind::Waste.is_outflow());
        assert!(MovementKind::NegativeAdjustment.is_outflow());
        assert!(!MovementKind::Purchase.is_outflow());
        assert!(!MovementKind::PositiveAdjustment.is_outflow());
    }

    #[test]
    fn test_closing_totals_from_payments() {
        let now = Utc::now();
        let make = |method, amount| Payment {
            id: "p".into(),
            order_id: "o".into(),
            session_id: "s".into(),
            method,
            amount,
            paid_at: now,
        };
        let payments = vec![
            make(PaymentMethod::Cash, 100.0),
            make(PaymentMethod::Cash, 50.0),
            make(PaymentMethod::Card, 75.5),
            make(PaymentMethod::Transfer, 20.0),
        ];

        let totals = ClosingTotals::from_payments(&payments);
        assert_eq!(totals.cash, 150.0);
        assert_eq!(totals.card, 75.5);
        assert_eq!(totals.transfer, 20.0);
        assert_eq!(totals.total, 245.5);
    }

    #[test]
    fn test_product_has_stock_for() {
        let now = Utc::now();
        let product = Product {
            id: "p".into(),
            name: "Tomate".into(),
            unit: UnitOfMeasure::Kg,
            stock: 10.0,
            avg_cost: 2.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(product.has_stock_for(10.0));
        assert!(product.has_stock_for(3.5));
        assert!(!product.has_stock_for(10.000001));
    }
}
