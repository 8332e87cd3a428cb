//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().search("kopi")                                  │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search(&self, query)                                              │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── create(&self, product)                                            │
//! │  ├── update(&self, id, changes)                                        │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Registration, login, profile
//! - [`product::ProductRepository`] - Product CRUD and search
//! - [`catalog::CatalogRepository`] - Categories and suppliers
//! - [`transaction::TransactionRecorder`] - Atomic stock movements
//! - [`transaction::TransactionRepository`] - Movement history
//! - [`dashboard::DashboardRepository`] - Reporting aggregates
//!
//! The helpers below generate identifiers against live tables. They take a
//! bare connection so callers can run them inside their own transaction.

pub mod catalog;
pub mod dashboard;
pub mod product;
pub mod transaction;
pub mod user;

use sqlx::SqliteConnection;
use stockroom_core::{CoreError, RandomId, SequentialId};

use crate::error::DbResult;

/// Attempts at drawing an unused random identifier.
const RANDOM_ID_MAX_TRIES: usize = 20;

/// Returns the id after the numerically largest `<prefix><digits>` id in
/// `table`.
///
/// Ids of any other shape (random suffixes, other prefixes sharing the first
/// letter) are ignored, so `TD001` never counts as a `T` id.
pub(crate) async fn next_sequential_id(
    conn: &mut SqliteConnection,
    table: &'static str,
    scheme: SequentialId,
) -> DbResult<String> {
    let sql = format!(
        "SELECT id FROM {table} \
         WHERE id GLOB ?1 || '[0-9]*' \
           AND substr(id, ?2) NOT GLOB '*[^0-9]*' \
         ORDER BY CAST(substr(id, ?2) AS INTEGER) DESC \
         LIMIT 1"
    );

    let current: Option<String> = sqlx::query_scalar(&sql)
        .bind(scheme.prefix())
        .bind(scheme.prefix().len() as i64 + 1)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(scheme.next_after(current.as_deref()))
}

/// Draws random ids until one is unused in `table`.
pub(crate) async fn unused_random_id(
    conn: &mut SqliteConnection,
    table: &'static str,
    scheme: RandomId,
) -> DbResult<String> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");

    for _ in 0..RANDOM_ID_MAX_TRIES {
        // ThreadRng is not Send; keep it out of the await.
        let candidate = scheme.generate(&mut rand::thread_rng());

        let taken: bool = sqlx::query_scalar(&sql)
            .bind(&candidate)
            .fetch_one(&mut *conn)
            .await?;

        if !taken {
            return Ok(candidate);
        }
    }

    Err(CoreError::IdSpaceExhausted {
        prefix: scheme.prefix().to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::ids::{DETAIL_IDS, TRANSACTION_IDS};

    async fn insert_header(db: &Database, id: &str) {
        sqlx::query("INSERT INTO transactions (id, transaction_type) VALUES (?, 'IN')")
            .bind(id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_first_sequential_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let id = next_sequential_id(&mut conn, "transactions", TRANSACTION_IDS)
            .await
            .unwrap();
        assert_eq!(id, "T001");
    }

    #[tokio::test]
    async fn test_sequential_orders_numerically_and_skips_random() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for id in ["T009", "T010", "TINAB12CD", "TOUT99ZZ11", "T2"] {
            insert_header(&db, id).await;
        }

        let mut conn = db.pool().acquire().await.unwrap();
        let id = next_sequential_id(&mut conn, "transactions", TRANSACTION_IDS)
            .await
            .unwrap();
        assert_eq!(id, "T011");
    }

    #[tokio::test]
    async fn test_sequential_widens_past_999() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        insert_header(&db, "T999").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let id = next_sequential_id(&mut conn, "transactions", TRANSACTION_IDS)
            .await
            .unwrap();
        assert_eq!(id, "T1000");
    }

    #[tokio::test]
    async fn test_detail_prefix_is_separate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        insert_header(&db, "T005").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let id = next_sequential_id(&mut conn, "transaction_details", DETAIL_IDS)
            .await
            .unwrap();
        assert_eq!(id, "TD001");
    }

    #[tokio::test]
    async fn test_unused_random_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let id = unused_random_id(&mut conn, "transactions", RandomId::new("TIN", 6))
            .await
            .unwrap();
        assert!(id.starts_with("TIN"));
        assert_eq!(id.len(), 9);
    }
}
