//! # Costing Module
//!
//! Weighted-average cost math and the ledger's fixed-precision rounding.
//!
//! ## Why Fixed Precision?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT DRIFT PROBLEM                                       │
//! │                                                                         │
//! │  Stock quantities are fractional (0.25 kg of cheese), so integer units  │
//! │  don't fit the way cents fit money. But raw f64 accumulates drift:      │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004   ❌                                 │
//! │                                                                         │
//! │  Across thousands of movements the product snapshot and the ledger      │
//! │  balance would slowly diverge and the consistency check would fire      │
//! │  on phantom differences.                                                │
//! │                                                                         │
//! │  OUR RULE: every persisted quantity/cost is rounded to 6 decimal        │
//! │  places at the point of write, and consistency comparisons happen at    │
//! │  the same precision.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Weighted-Average Costing
//! Inflows from purchases recompute the running average as a stock-weighted
//! mean; outflows consume at the current average and never change it.
//!
//! ```rust
//! use fonda_core::costing::weighted_average;
//!
//! // 10 units on hand at 2.0; buy 10 more at 4.0 → average 3.0
//! let avg = weighted_average(10.0, 2.0, 10.0, 4.0);
//! assert_eq!(avg, 3.0);
//! ```

/// Decimal places kept on every persisted quantity and cost.
pub const PRECISION: u32 = 6;

const SCALE: f64 = 1_000_000.0; // 10^PRECISION

/// Tolerance for equality at ledger precision.
///
/// Half a unit in the 6th decimal place: two values that round to the same
/// 6-dp figure always compare equal, regardless of binary representation.
const EPSILON: f64 = 0.5 / SCALE;

/// Rounds a quantity or cost to the ledger precision (6 decimal places).
///
/// Applied to every field before it is persisted.
#[inline]
pub fn round_qty(value: f64) -> f64 {
    (value * SCALE).round() / SCALE
}

/// Compares two quantities at ledger precision.
///
/// Used by the consistency check and the stock-floor guard, so a nanoscale
/// binary residue never masquerades as a real shortage or surplus.
#[inline]
pub fn qty_eq(a: f64, b: f64) -> bool {
    (round_qty(a) - round_qty(b)).abs() < EPSILON
}

/// Computes the new weighted-average cost after a purchase inflow.
///
/// ## Formula
/// ```text
/// new_avg = (stock × avg_cost + quantity × unit_cost) / (stock + quantity)
/// ```
///
/// ## Preconditions
/// `quantity > 0`, so the denominator is strictly positive even on an empty
/// shelf; callers validate before reaching this function.
///
/// ## Example
/// ```rust
/// use fonda_core::costing::weighted_average;
///
/// // First purchase onto an empty shelf takes the purchase cost outright
/// assert_eq!(weighted_average(0.0, 0.0, 10.0, 2.0), 2.0);
/// ```
#[inline]
pub fn weighted_average(stock: f64, avg_cost: f64, quantity: f64, unit_cost: f64) -> f64 {
    (stock * avg_cost + quantity * unit_cost) / (stock + quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_qty() {
        assert_eq!(round_qty(1.2345678), 1.234568);
        assert_eq!(round_qty(1.2345674), 1.234567);
        assert_eq!(round_qty(0.1 + 0.2), 0.3);
        assert_eq!(round_qty(-2.5000004), -2.5);
    }

    #[test]
    fn test_qty_eq_at_precision() {
        assert!(qty_eq(0.1 + 0.2, 0.3));
        assert!(qty_eq(10.0, 10.0000001));
        assert!(!qty_eq(10.0, 10.000001));
        assert!(!qty_eq(10.0, 9.999999));
    }

    #[test]
    fn test_weighted_average_basic() {
        // 10 @ 2.0 then 10 @ 4.0 → 20 @ 3.0
        let avg = weighted_average(10.0, 2.0, 10.0, 4.0);
        assert_eq!(avg, 3.0);
    }

    #[test]
    fn test_weighted_average_empty_shelf() {
        let avg = weighted_average(0.0, 0.0, 5.0, 7.5);
        assert_eq!(avg, 7.5);
    }

    #[test]
    fn test_weighted_average_matches_recomputation() {
        // After a sequence of purchases, the running average must equal the
        // stock-weighted mean of all purchase costs.
        let purchases: &[(f64, f64)] = &[(4.0, 1.0), (6.0, 2.0), (10.0, 3.5), (0.5, 10.0)];

        let mut stock = 0.0;
        let mut avg = 0.0;
        for &(qty, cost) in purchases {
            avg = round_qty(weighted_average(stock, avg, qty, cost));
            stock = round_qty(stock + qty);
        }

        let total_qty: f64 = purchases.iter().map(|(q, _)| q).sum();
        let total_value: f64 = purchases.iter().map(|(q, c)| q * c).sum();
        assert!(qty_eq(avg, total_value / total_qty));
    }

    #[test]
    fn test_zero_cost_purchase_dilutes_average() {
        // Donated/free stock IS a purchase at cost 0 and dilutes the average,
        // unlike a positive adjustment which leaves it untouched.
        let avg = weighted_average(10.0, 4.0, 10.0, 0.0);
        assert_eq!(avg, 2.0);
    }
}
