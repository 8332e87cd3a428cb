//! # Validation Module
//!
//! Input validation utilities for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (JS)                                                │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Deserialization / multipart field parsing                         │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (unit_price >= 0), CHECK (stock >= 0)                       │
//! │  ├── UNIQUE (username), UNIQUE (email)                                 │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multipart forms deliver every field as text, so numeric product fields
//! are parsed here rather than by serde.

use crate::error::ValidationError;
use crate::types::LineItem;
use crate::{MAX_ITEM_QUANTITY, MAX_MOVEMENT_ITEMS, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Gula Pasir 1kg ").unwrap(), "Gula Pasir 1kg");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a username and returns it trimmed.
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }

    if username.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    Ok(username.to_string())
}

/// Validates an email address and returns it trimmed.
///
/// Only the shape `local@domain` is checked.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_string())
        }
        _ => Err(ValidationError::invalid("email", "must look like name@domain")),
    }
}

/// Validates a password. Passwords are not trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.trim().is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// Empty is fine (lists everything). Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "q".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Turns a blank reference (`""`, `"  "`) into `None`.
pub fn optional_ref(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a unit price from form text.
///
/// ## Rules
/// - Blank means 0
/// - Whole number of minor units
/// - Must be >= 0
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::parse_price;
///
/// assert_eq!(parse_price("15000").unwrap(), 15000);
/// assert_eq!(parse_price("").unwrap(), 0);
/// assert!(parse_price("-1").is_err());
/// assert!(parse_price("abc").is_err());
/// ```
pub fn parse_price(raw: &str) -> ValidationResult<i64> {
    let price = parse_whole_number("unit_price", raw)?;
    validate_price(price)?;
    Ok(price)
}

/// Parses a stock level from form text.
///
/// Same rules as [`parse_price`]: blank is 0, whole numbers only, >= 0.
/// A zero fraction such as `"3.0"` counts as whole.
pub fn parse_stock(raw: &str) -> ValidationResult<i64> {
    let stock = parse_whole_number("stock", raw)?;
    validate_stock(stock)?;
    Ok(stock)
}

fn parse_whole_number(field: &str, raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }

    // Form inputs of type number may submit "12500.00".
    let whole = match raw.split_once('.') {
        Some((int, frac)) if !int.is_empty() && frac.chars().all(|c| c == '0') => int,
        Some(_) => {
            return Err(ValidationError::invalid(
                field,
                "must be a whole number of minor units",
            ))
        }
        None => raw,
    };

    whole
        .parse::<i64>()
        .map_err(|_| ValidationError::invalid(field, "must be a whole number"))
}

/// Validates a unit price in minor units.
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the quantity of one movement line.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Stock In form: P001 × 5                                                │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0?        → 400 "quantity must be positive"           │
/// │       ├── qty > 1_000_000? → 400 out of range                          │
/// │       └── OK → recorder                                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the line items of a stock movement.
///
/// ## Rules
/// - At least one line (`rows` is required)
/// - At most [`MAX_MOVEMENT_ITEMS`] lines
/// - Every line names a product and has a valid quantity
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::required("rows"));
    }

    if items.len() > MAX_MOVEMENT_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "rows".to_string(),
            min: 1,
            max: MAX_MOVEMENT_ITEMS as i64,
        });
    }

    for item in items {
        if item.product_id.trim().is_empty() {
            return Err(ValidationError::required("itemId"));
        }
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
