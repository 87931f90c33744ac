//! # Error Types
//!
//! Domain-specific error types for fonda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  fonda-core errors (this file)                                  │
//! │  ├── CoreError        - Business rule violations                │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  fonda-db errors (separate crate)                               │
//! │  └── DbError          - Database operation failures             │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → DbError → boundary layer   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, order id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every error is a recoverable, caller-reported business error; the
//!    enclosing transaction rolls back fully and nothing is suppressed

use thiserror::Error;

use crate::types::{OrderStatus, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages by the
/// boundary layer; the core never formats a transport response itself.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced entity id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Entity exists but is deactivated and cannot participate in operations.
    #[error("{entity} is inactive: {id}")]
    Inactive { entity: String, id: String },

    /// Insufficient stock to complete an outflow.
    ///
    /// ## When This Occurs
    /// - A sale consumption exceeds the ingredient's stock
    /// - A negative count adjustment exceeds current stock
    /// - A waste registration exceeds current stock
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: f64,
        requested: f64,
    },

    /// A dish has no recipe and therefore cannot be sold.
    ///
    /// Paying for an order consumes raw products according to each dish's
    /// recipe. A recipe-less dish would consume nothing, silently corrupting
    /// stock valuation, so it blocks the payment instead.
    #[error("Dish {dish} has no recipe")]
    MissingRecipe { dish: String },

    /// An order with no lines cannot be paid: a $0 payment would settle
    /// nothing and still free the table.
    #[error("Order {order_id} has no lines")]
    EmptyOrder { order_id: String },

    /// The order transition table forbids this state change.
    #[error("Invalid order transition from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The acting role may not drive this transition.
    #[error("Role {role:?} may not transition an order to {to:?}")]
    RoleNotAllowed { role: Role, to: OrderStatus },

    /// The order is in a terminal state and cannot be modified.
    #[error("Order {order_id} is {status:?}, cannot perform operation")]
    OrderFinalized {
        order_id: String,
        status: OrderStatus,
    },

    /// Only served orders can be paid for.
    #[error("Order {order_id} is {status:?}, only Served orders can be paid")]
    OrderNotServed {
        order_id: String,
        status: OrderStatus,
    },

    /// The table already hosts an order.
    #[error("Table {number} is occupied")]
    TableOccupied { number: i64 },

    /// A table with an active (non-terminal) order cannot be freed.
    #[error("Table {number} has an active order and cannot be freed")]
    TableHasActiveOrder { number: i64 },

    /// A cash session is already open (global singleton).
    #[error("A cash session is already open")]
    SessionAlreadyOpen,

    /// No cash session is open, so payments cannot be accepted.
    #[error("No open cash session")]
    NoOpenSession,

    /// The cash session is not open (already closed).
    #[error("Cash session {session_id} is already closed")]
    SessionClosed { session_id: String },

    /// Closing is blocked while the period still has unresolved orders.
    #[error("Cannot close session: {pending} order(s) still unsettled in the period")]
    UnsettledOrders { pending: i64 },

    /// The physical count was already applied (one-way transition).
    #[error("Physical count {count_id} is already applied")]
    CountAlreadyApplied { count_id: String },

    /// An order can be paid at most once.
    #[error("Order {order_id} has already been paid")]
    DuplicatePayment { order_id: String },

    /// The ledger's latest balance disagrees with the product snapshot.
    ///
    /// ## When This Occurs
    /// - Detected by the integrity check after seeding or bulk operations,
    ///   never on the hot path. Indicates a bug or out-of-band mutation.
    #[error("Ledger inconsistency for {product}: last movement balance {ledger}, product stock {snapshot}")]
    LedgerInconsistency {
        product: String,
        ledger: f64,
        snapshot: f64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an Inactive error for a given entity type and id.
    pub fn inactive(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::Inactive {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid UUID, unknown unit of measure).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value where uniqueness is required.
    #[error("{field} '{value}' is duplicated")]
    Duplicate { field: String, value: String },

    /// A collection that must carry at least one element is empty.
    #[error("{field} must not be empty")]
    EmptyCollection { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Tomate".to_string(),
            available: 3.0,
            requested: 5.0,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Tomate: available 3, requested 5"
        );

        let err = CoreError::InvalidTransition {
            from: OrderStatus::Served,
            to: OrderStatus::Open,
        };
        assert_eq!(
            err.to_string(),
            "Invalid order transition from Served to Open"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "supplier".to_string(),
        };
        assert_eq!(err.to_string(), "supplier is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
