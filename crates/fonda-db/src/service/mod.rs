//! # Service Module
//!
//! Transactional services for Fonda POS.
//!
//! ## Services vs Repositories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Mutations Live                                 │
//! │                                                                         │
//! │  Repository (crate::repository)      Service (THIS MODULE)             │
//! │  ─────────────────────────────       ─────────────────────────────     │
//! │  Single-statement reads              Multi-step mutations              │
//! │  One pooled connection               ONE transaction per operation     │
//! │  No business rules                   Business rules enforced inside    │
//! │                                      the same transaction that writes  │
//! │                                                                         │
//! │  Example: register_payment                                             │
//! │    BEGIN                                                                │
//! │      check session open, order served, no prior payment                │
//! │      consume recipe ingredients (ledger outputs)                       │
//! │      insert payment, mark order paid, free table                       │
//! │    COMMIT          ← or drop the transaction: nothing happened         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger helpers in [`inventory`] operate on `&mut SqliteConnection` so
//! larger flows (purchases, count application, payment consumption) compose
//! into a single atomic transaction.
//!
//! ## Available Services
//!
//! - [`inventory::InventoryService`] - The stock ledger (movements, kardex)
//! - [`catalog::CatalogService`] - Product and dish administration
//! - [`orders::OrderService`] - Order lifecycle and lines
//! - [`purchases::PurchaseService`] - Purchase documents feeding the ledger
//! - [`counts::CountService`] - Physical count drafts and application
//! - [`cash::CashService`] - Cash sessions, payments, closing

pub mod cash;
pub mod catalog;
pub mod counts;
pub mod inventory;
pub mod orders;
pub mod purchases;
