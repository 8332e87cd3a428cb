//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Case-insensitive substring search over name and description
//! - CRUD with `P001`-style sequential ids
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /items?q=KOPI                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lower(name) LIKE '%kopi%' OR lower(description) LIKE '%kopi%'         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  P001 | Kopi Bubuk 200g  | ...                ← MATCH (name)           │
//! │  P004 | Gula Aren        | "untuk kopi susu"  ← MATCH (description)    │
//! │  P007 | Teh Celup        | ...                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is only set directly at creation and by manual edits. Movements
//! change it through [`super::transaction::TransactionRecorder`].

use sqlx::{Sqlite, SqlitePool};
use stockroom_core::ids::PRODUCT_IDS;
use stockroom_core::validation::{
    validate_price, validate_product_name, validate_search_query, validate_stock,
};
use stockroom_core::{CoreError, NewProduct, Product, ProductUpdate};
use tracing::{debug, info};

use super::next_sequential_id;
use crate::error::{DbError, DbResult};

pub(super) const PRODUCT_COLUMNS: &str =
    "id, name, category_id, supplier_id, description, unit_price, stock, photo";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, optionally filtered by `query`.
    ///
    /// An empty query returns the whole catalog ordered by id.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        let products = if query.is_empty() {
            sqlx::query_as::<Sqlite, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            let pattern = format!("%{}%", query.to_lowercase());
            sqlx::query_as::<Sqlite, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products \
                 WHERE lower(name) LIKE ?1 OR lower(description) LIKE ?1 \
                 ORDER BY id"
            ))
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?
        };

        debug!(query = %query, count = products.len(), "Product search");
        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<Sqlite, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Creates a product with the next free `P###` id.
    ///
    /// ## Errors
    /// - Validation error for a blank name or negative price/stock
    /// - `ForeignKeyViolation` when the category or supplier doesn't exist
    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        let name = validate_product_name(&new.name)?;
        validate_price(new.unit_price)?;
        validate_stock(new.stock)?;

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let id = next_sequential_id(&mut tx, "products", PRODUCT_IDS).await?;

        let product = Product {
            id,
            name,
            category_id: new.category_id,
            supplier_id: new.supplier_id,
            description: new.description.trim().to_string(),
            unit_price: new.unit_price,
            stock: new.stock,
            photo: new.photo,
        };

        sqlx::query(
            "INSERT INTO products \
             (id, name, category_id, supplier_id, description, unit_price, stock, photo) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(&product.description)
        .bind(product.unit_price)
        .bind(product.stock)
        .bind(&product.photo)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Applies a partial update and returns the stored product.
    ///
    /// Runs under the write lock so a movement recorded concurrently can't
    /// be overwritten. `stock` is only written when the update sets it.
    pub async fn update(&self, id: &str, changes: ProductUpdate) -> DbResult<Product> {
        let new_stock = changes.stock;
        if let Some(stock) = new_stock {
            validate_stock(stock)?;
        }

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let current = sqlx::query_as::<Sqlite, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        let mut product = changes.apply(&current);
        product.name = validate_product_name(&product.name)?;
        product.description = product.description.trim().to_string();
        validate_price(product.unit_price)?;

        sqlx::query(
            "UPDATE products SET \
             name = ?, category_id = ?, supplier_id = ?, description = ?, \
             unit_price = ?, stock = COALESCE(?, stock), photo = ? \
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(&product.description)
        .bind(product.unit_price)
        .bind(new_stock)
        .bind(&product.photo)
        .bind(&product.id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(product_id = %product.id, stock_set = new_stock.is_some(), "Product updated");
        Ok(product)
    }

    /// Deletes a product and returns the deleted row.
    ///
    /// Products that appear in recorded movements are kept; deleting them
    /// fails with `CoreError::ProductInUse`.
    pub async fn delete(&self, id: &str) -> DbResult<Product> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let product = sqlx::query_as::<Sqlite, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM transaction_details WHERE product_id = ?)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if referenced {
            return Err(CoreError::ProductInUse(id.to_string()).into());
        }

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(product_id = %id, "Product deleted");
        Ok(product)
    }

    /// Returns the total number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
