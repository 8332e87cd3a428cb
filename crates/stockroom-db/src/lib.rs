//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite storage for users, the product catalog and stock movements, using
//! sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /transactions/in)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ UserRepository     │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepository  │  │ 001_init   │  │   │
//! │  │   │               │    │ CatalogRepository  │  │ 002_ref    │  │   │
//! │  │   │               │    │ TransactionRecorder│  │            │  │   │
//! │  │   │               │    │ DashboardRepository│  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (./data/stockroom.db by default)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//! use stockroom_core::{LineItem, MovementType, NewStockMovement};
//!
//! let db = Database::new(DbConfig::new("stockroom.db")).await?;
//!
//! let movement = NewStockMovement::new(MovementType::In, vec![LineItem::new("P001", 5)]);
//! let recorded = db.recorder().record(movement).await?;
//! println!("recorded {}", recorded.id);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::CatalogRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::product::ProductRepository;
pub use repository::transaction::{TransactionRecorder, TransactionRepository};
pub use repository::user::UserRepository;
