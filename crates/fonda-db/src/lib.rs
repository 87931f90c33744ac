//! # fonda-db: Database Layer for Fonda POS
//!
//! This crate provides database access for the Fonda POS backend.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fonda POS Data Flow                              │
//! │                                                                         │
//! │  Boundary layer call (e.g. pay order)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     fonda-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌───────────────────┐  │   │
//! │  │   │   Database   │   │ Repositories │   │     Services      │  │   │
//! │  │   │  (pool.rs)   │   │  (reads)     │   │  (transactional   │  │   │
//! │  │   │              │   │              │   │    mutations)     │  │   │
//! │  │   │ SqlitePool   │◄──│ ProductRepo  │   │ InventoryService  │  │   │
//! │  │   │ Migrations   │   │ OrderRepo    │◄──│ OrderService      │  │   │
//! │  │   │ WAL mode     │   │ CashRepo ... │   │ CashService ...   │  │   │
//! │  │   └──────────────┘   └──────────────┘   └───────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL, foreign keys on)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Read access per aggregate
//! - [`service`] - Transactional services (ledger, orders, cash, counts)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fonda_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/fonda.db")).await?;
//!
//! // Reads go through repositories
//! let products = db.products().list(false).await?;
//!
//! // Mutations go through services, one transaction each
//! let payment = db.cash_service().register_payment(&order_id, method).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cash::CashRepository;
pub use repository::count::CountRepository;
pub use repository::dish::DishRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::staff::StaffRepository;
pub use repository::table::TableRepository;

// Service re-exports
pub use service::cash::{CashService, SessionReport};
pub use service::catalog::{CatalogService, InitialStock};
pub use service::counts::{CountLineInput, CountService};
pub use service::inventory::InventoryService;
pub use service::orders::OrderService;
pub use service::purchases::{PurchaseLineInput, PurchaseService};
