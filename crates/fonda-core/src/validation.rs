//! # Validation Module
//!
//! Input validation utilities for Fonda POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Boundary layer (HTTP, out of scope)                           │
//! │  ├── Shape checks, deserialization                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL, UNIQUE, CHECK, foreign key constraints                   │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::UnitOfMeasure;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity: strictly positive and finite.
pub fn validate_quantity(field: &str, quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a unit cost: non-negative and finite. Zero is allowed
/// (donated or promotional stock still enters the ledger as a purchase).
pub fn validate_unit_cost(cost: f64) -> ValidationResult<()> {
    if !cost.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "unit_cost".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if cost < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "unit_cost".to_string(),
        });
    }
    Ok(())
}

/// Validates a dish price: strictly positive.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    validate_quantity("price", price)
}

/// Validates an opening float: non-negative.
pub fn validate_opening_float(amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "opening_float".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, dish, supplier).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 120 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 120,
        });
    }
    Ok(())
}

/// Parses and validates a unit of measure, accepting aliases.
pub fn validate_unit(raw: &str) -> ValidationResult<UnitOfMeasure> {
    UnitOfMeasure::parse(raw).ok_or_else(|| ValidationError::InvalidFormat {
        field: "unit".to_string(),
        reason: "allowed: kg, g, lt, ml, unit".to_string(),
    })
}

/// Validates a UUID string format.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Recipe Validator
// =============================================================================

/// Validates an ingredient payload: non-empty, positive quantities, no
/// duplicate product within one dish.
///
/// Existence/active checks on the products need the database and live in the
/// dish service; this catches everything checkable without I/O.
pub fn validate_ingredients(entries: &[(String, f64)]) -> ValidationResult<()> {
    if entries.is_empty() {
        return Err(ValidationError::EmptyCollection {
            field: "ingredients".to_string(),
        });
    }

    let mut seen: Vec<&str> = Vec::with_capacity(entries.len());
    for (product_id, quantity_per_unit) in entries {
        validate_quantity("quantity_per_unit", *quantity_per_unit)?;
        if seen.contains(&product_id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "product_id".to_string(),
                value: product_id.clone(),
            });
        }
        seen.push(product_id);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 0.001).is_ok());
        assert!(validate_quantity("quantity", 10.0).is_ok());

        assert!(validate_quantity("quantity", 0.0).is_err());
        assert!(validate_quantity("quantity", -1.0).is_err());
        assert!(validate_quantity("quantity", f64::NAN).is_err());
        assert!(validate_quantity("quantity", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_unit_cost() {
        assert!(validate_unit_cost(0.0).is_ok());
        assert!(validate_unit_cost(12.5).is_ok());
        assert!(validate_unit_cost(-0.01).is_err());
        assert!(validate_unit_cost(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Tomate").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert_eq!(validate_unit("kg").unwrap(), UnitOfMeasure::Kg);
        assert_eq!(validate_unit("LITROS").unwrap(), UnitOfMeasure::Lt);
        assert!(validate_unit("stone").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_ingredients() {
        let ok = vec![("a".to_string(), 0.5), ("b".to_string(), 2.0)];
        assert!(validate_ingredients(&ok).is_ok());

        assert!(validate_ingredients(&[]).is_err());

        let zero_qty = vec![("a".to_string(), 0.0)];
        assert!(validate_ingredients(&zero_qty).is_err());

        let dupe = vec![("a".to_string(), 1.0), ("a".to_string(), 2.0)];
        let err = validate_ingredients(&dupe).unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { .. }));
    }
}
