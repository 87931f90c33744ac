//! # Repository Module
//!
//! Database repository implementations for Fonda POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Repositories abstract read access behind a clean API.                  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(id)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── list(&self, include_inactive)                                      │
//! │  └── kardex(&self, product_id)                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Division of labor:                                                     │
//! │  • Repositories: reads and listings, one connection from the pool       │
//! │  • Services (crate::service): mutations, one transaction per operation  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products and the movement ledger (kardex)
//! - [`dish::DishRepository`] - Dishes and their recipes
//! - [`table::TableRepository`] - Dining tables
//! - [`order::OrderRepository`] - Orders and order lines
//! - [`purchase::PurchaseRepository`] - Purchases and purchase lines
//! - [`count::CountRepository`] - Physical counts
//! - [`cash::CashRepository`] - Cash sessions, payments, closing summaries
//! - [`staff::StaffRepository`] - Staff lookups

pub mod cash;
pub mod count;
pub mod dish;
pub mod order;
pub mod product;
pub mod purchase;
pub mod staff;
pub mod table;
