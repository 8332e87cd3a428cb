//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate holds the domain model of the inventory system as pure
//! functions and plain types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Static frontend (HTML / JS)                     │   │
//! │  │    Products ──► Stock In ──► Stock Out ──► History ──► Dash     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ fetch (JSON / multipart)               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockroom-server (axum)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │    ids    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ T001, TD… │  │   rules   │  │   │
//! │  │   │ Movement  │  │           │  │ TIN-XXXX  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockroom-db (Database Layer)                  │   │
//! │  │        SQLite queries, migrations, repositories, recorder       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Movement, User, ...)
//! - [`money`] - Integer money in the smallest currency unit
//! - [`ids`] - Human-readable identifier schemes
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::ids::SequentialId;
//!
//! let scheme = SequentialId::new("T", 3);
//! assert_eq!(scheme.next_after(Some("T041")), "T042");
//! assert_eq!(scheme.next_after(None), "T001");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ids;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use ids::{IdScheme, RandomId, SequentialId};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single stock movement.
pub const MAX_MOVEMENT_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Catches typing accidents (an extra zero or two) on large deliveries.
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;

/// Minimum password length accepted at registration and profile update.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Products below this stock level raise the dashboard low-stock alert.
pub const LOW_STOCK_ALERT_THRESHOLD: i64 = 5;

/// Products below this stock level are listed as "nearly empty" on the
/// dashboard summary.
pub const NEARLY_EMPTY_THRESHOLD: i64 = 10;

/// Row limit for dashboard lists (nearly empty, top items).
pub const DASHBOARD_LIST_LIMIT: i64 = 5;
