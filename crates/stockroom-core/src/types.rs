//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ TransactionHdr  │   │ TransactionDtl  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id  (P001)     │◄─┐│  id  (T001)     │◄──│  transaction_id │       │
//! │  │  unit_price     │  ││  movement_type  │   │  product_id ────┼──┐    │
//! │  │  stock          │  ││  supplier_id    │   │  quantity       │  │    │
//! │  └─────────────────┘  ││  user_id        │   │  unit_price *   │  │    │
//! │                       │└─────────────────┘   └─────────────────┘  │    │
//! │                       └───────────────────────────────────────────┘    │
//! │                                                                         │
//! │  * price snapshot: copied from Product.unit_price at insert time       │
//! │                                                                         │
//! │  Request side: NewStockMovement ──► recorder ──► RecordedMovement      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities derive `sqlx::FromRow` behind the `sqlx` feature so the database
//! crate can decode rows straight into them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_line_items, ValidationResult};

// =============================================================================
// Movement Type
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum MovementType {
    /// Goods received; stock goes up.
    In,
    /// Goods issued; stock goes down.
    Out,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }

    /// Stock delta for `quantity` units moved in this direction.
    pub const fn stock_delta(&self, quantity: i64) -> i64 {
        match self {
            MovementType::In => quantity,
            MovementType::Out => -quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            _ => Err(ValidationError::NotAllowed {
                field: "transaction_type".to_string(),
                allowed: vec!["IN".to_string(), "OUT".to_string()],
            }),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// A stored user account, including the password hash.
///
/// Never serialized; handlers return [`UserSummary`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Registration input. The password is still plain text here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Profile changes. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// `P001`, `P002`, ...
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub description: String,
    /// Price in minor units.
    pub unit_price: i64,
    pub stock: i64,
    /// Relative path such as `/uploads/3f2a….png`.
    pub photo: Option<String>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.unit_price)
    }

    /// Whether an outbound movement of `quantity` fits the current stock.
    #[inline]
    pub fn can_issue(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Fields for a new product. The id is assigned by the repository.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub description: String,
    pub unit_price: i64,
    pub stock: i64,
    pub photo: Option<String>,
}

/// Partial product update.
///
/// `photo` is doubly optional: `None` keeps the current photo,
/// `Some(None)` clears it, `Some(Some(path))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category_id: Option<Option<String>>,
    pub supplier_id: Option<Option<String>>,
    pub description: Option<String>,
    pub unit_price: Option<i64>,
    pub stock: Option<i64>,
    pub photo: Option<Option<String>>,
}

impl ProductUpdate {
    /// Produces the updated product. The id never changes.
    pub fn apply(self, current: &Product) -> Product {
        Product {
            id: current.id.clone(),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            category_id: self
                .category_id
                .unwrap_or_else(|| current.category_id.clone()),
            supplier_id: self
                .supplier_id
                .unwrap_or_else(|| current.supplier_id.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            unit_price: self.unit_price.unwrap_or(current.unit_price),
            stock: self.stock.unwrap_or(current.stock),
            photo: self.photo.unwrap_or_else(|| current.photo.clone()),
        }
    }
}

/// Product category (`C001`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Supplier (`S001`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Header row of a recorded stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionHeader {
    pub id: String,
    pub transaction_type: MovementType,
    pub supplier_id: Option<String>,
    pub user_id: Option<String>,
    pub note: String,
    /// Assigned by the database (`CURRENT_TIMESTAMP`, UTC).
    #[ts(as = "String")]
    pub transaction_date: NaiveDateTime,
}

/// Detail row: one product line of a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionDetail {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Price snapshot taken when the line was recorded.
    pub unit_price: i64,
}

/// One requested line of a stock movement.
///
/// `supplier_id` and `note` are per-row hints; the movement only looks at
/// the first row's values, and only when the movement itself has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
            supplier_id: None,
            note: None,
        }
    }
}

/// Who submitted a movement, as claimed by the client.
///
/// Resolution order: `username` lookup, then `user_id` if that id exists,
/// otherwise the movement is recorded without a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserIdentity {
    pub username: Option<String>,
    pub user_id: Option<String>,
}

/// A stock movement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockMovement {
    pub movement_type: MovementType,
    pub supplier_id: Option<String>,
    pub note: Option<String>,
    pub items: Vec<LineItem>,
    pub user: UserIdentity,
}

impl NewStockMovement {
    pub fn new(movement_type: MovementType, items: Vec<LineItem>) -> Self {
        NewStockMovement {
            movement_type,
            supplier_id: None,
            note: None,
            items,
            user: UserIdentity::default(),
        }
    }

    /// Checks line items before anything is written.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_line_items(&self.items)
    }

    /// Supplier stored on the header.
    ///
    /// Outbound movements never carry a supplier. Blank strings count as
    /// missing. Falls back to the first row's supplier.
    pub fn resolved_supplier(&self) -> Option<String> {
        if self.movement_type == MovementType::Out {
            return None;
        }
        non_blank(self.supplier_id.as_deref())
            .or_else(|| non_blank(self.items.first()?.supplier_id.as_deref()))
    }

    /// Note stored on the header; empty when neither the movement nor the
    /// first row has one.
    pub fn resolved_note(&self) -> String {
        non_blank(self.note.as_deref())
            .or_else(|| non_blank(self.items.first()?.note.as_deref()))
            .unwrap_or_default()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Outcome of a committed stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecordedMovement {
    pub id: String,
    pub movement_type: MovementType,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_value: Money,
}

/// One line of the movement history, joined with names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HistoryEntry {
    pub transaction_id: String,
    pub transaction_type: MovementType,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub transaction_date: String,
    pub note: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub supplier_name: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// A product and its stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLevel {
    pub id: String,
    pub name: String,
    pub stock: i64,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardSummary {
    pub product_count: i64,
    pub category_count: i64,
    pub supplier_count: i64,
    pub total_stock: i64,
    pub total_value: Money,
    pub transactions_today: i64,
    pub nearly_empty: Vec<StockLevel>,
}

/// Movement count for one week of the current year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WeeklyCount {
    pub week: i64,
    pub count: i64,
}

/// Total quantity moved for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemTotal {
    pub product_id: String,
    pub name: String,
    pub total: i64,
}

/// Most moved products per direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopItems {
    pub outbound: Vec<ItemTotal>,
    pub inbound: Vec<ItemTotal>,
}

// =============================================================================
// Tests
// =============================================================================
