//! # fonda-core: Pure Business Logic for Fonda POS
//!
//! This crate is the **heart** of the restaurant POS and inventory backend.
//! It contains all business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fonda POS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Boundary layer (HTTP routing, auth) — out of scope     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    fonda-db (services + repositories)           │   │
//! │  │    transactional orchestration, SQLite persistence              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fonda-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  costing  │  │ order_flow │  │ validation│  │   │
//! │  │   │  Product  │  │ weighted  │  │ transition │  │   rules   │  │   │
//! │  │   │  Movement │  │  average  │  │   table    │  │   checks  │  │   │
//! │  │   │  Order …  │  │ rounding  │  │ role gates │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Movement, Dish, Order, CashSession…)
//! - [`costing`] - Weighted-average cost math, 6-decimal ledger precision
//! - [`order_flow`] - Order state machine and role narrowing
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Fixed Precision**: persisted quantities/costs round to 6 decimals
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use fonda_core::costing::{round_qty, weighted_average};
//!
//! // 10 units at 2.0 on hand; purchase 10 more at 4.0
//! let avg = round_qty(weighted_average(10.0, 2.0, 10.0, 4.0));
//! assert_eq!(avg, 3.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod order_flow;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use fonda_core::Product` instead of
// `use fonda_core::types::Product`.

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;
