//! # Stock Movement Repository
//!
//! Records stock movements atomically and reads movement history.
//!
//! ## Recording a Movement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /transactions/out  { rows: [P001×2, P003×1], username: "budi" }   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate rows (empty / bad quantity → 400, nothing written)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE ─── write lock held from here ───────────────┐        │
//! │       │                                                        │        │
//! │       ├── resolve user (username → id, else known user_id)     │        │
//! │       ├── next header id        T014                           │        │
//! │       ├── INSERT transactions   (T014, OUT, user, note)        │        │
//! │       │                                                        │        │
//! │       ├── for each row, in order:                              │        │
//! │       │     next detail id      TD031                          │        │
//! │       │     read product        missing → ProductNotFound      │        │
//! │       │     OUT: stock >= qty?  no → InsufficientStock         │        │
//! │       │     INSERT detail       (price snapshot)               │        │
//! │       │     UPDATE stock        ± qty                          │        │
//! │       │                                                        │        │
//! │       ▼                                                        │        │
//! │  COMMIT  ─────────────────────── or ROLLBACK on any error ─────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `BEGIN IMMEDIATE` takes SQLite's write lock up front, so two recorders
//! can never read the same "current max" id. The second one waits for the
//! first to commit (up to the busy timeout).

use std::time::Instant;

use sqlx::{SqliteConnection, SqlitePool};
use stockroom_core::ids::{DETAIL_IDS, TRANSACTION_IDS};
use stockroom_core::{
    CoreError, HistoryEntry, IdScheme, Money, MovementType, NewStockMovement, Product,
    RecordedMovement, TransactionDetail, TransactionHeader,
};
use tracing::{debug, info, warn};

use super::product::PRODUCT_COLUMNS;
use super::user::UserRepository;
use super::{next_sequential_id, unused_random_id};
use crate::error::{DbError, DbResult};

// =============================================================================
// Recorder
// =============================================================================

/// Writes stock movements: one header plus one detail per line, with the
/// matching stock changes, all in one database transaction.
#[derive(Debug, Clone)]
pub struct TransactionRecorder {
    pool: SqlitePool,
    id_scheme: IdScheme,
}

impl TransactionRecorder {
    pub fn new(pool: SqlitePool, id_scheme: IdScheme) -> Self {
        TransactionRecorder { pool, id_scheme }
    }

    /// Records a movement.
    ///
    /// ## Errors
    /// - Validation error: no rows, bad quantity (nothing is written)
    /// - `CoreError::ProductNotFound`: a row names an unknown product
    /// - `CoreError::InsufficientStock`: an outbound row exceeds stock
    /// - `ForeignKeyViolation`: unknown supplier
    ///
    /// Every error after `BEGIN` rolls the whole movement back.
    pub async fn record(&self, movement: NewStockMovement) -> DbResult<RecordedMovement> {
        let started = Instant::now();
        movement.validate()?;

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        match self.write(&mut tx, &movement).await {
            Ok(recorded) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                info!(
                    id = %recorded.id,
                    movement_type = %recorded.movement_type,
                    items = recorded.item_count,
                    quantity = recorded.total_quantity,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Stock movement recorded"
                );
                Ok(recorded)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                warn!(
                    movement_type = %movement.movement_type,
                    error = %err,
                    "Stock movement rolled back"
                );
                Err(err)
            }
        }
    }

    async fn write(
        &self,
        conn: &mut SqliteConnection,
        movement: &NewStockMovement,
    ) -> DbResult<RecordedMovement> {
        let user_id = UserRepository::resolve_in(
            conn,
            movement.user.username.as_deref(),
            movement.user.user_id.as_deref(),
        )
        .await?;

        let header_id = self.header_id(conn, movement.movement_type).await?;

        sqlx::query(
            "INSERT INTO transactions (id, transaction_type, supplier_id, user_id, note) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&header_id)
        .bind(movement.movement_type)
        .bind(movement.resolved_supplier())
        .bind(&user_id)
        .bind(movement.resolved_note())
        .execute(&mut *conn)
        .await?;

        debug!(id = %header_id, user_id = ?user_id, "Header inserted");

        let mut total_value = Money::zero();

        for item in &movement.items {
            let detail_id = self.detail_id(conn).await?;

            let product = sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
            ))
            .bind(&item.product_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

            if movement.movement_type == MovementType::Out
                && !product.can_issue(item.quantity)
            {
                return Err(CoreError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    available: product.stock,
                    requested: item.quantity,
                }
                .into());
            }
            let unit_price = product.unit_price;

            sqlx::query(
                "INSERT INTO transaction_details \
                 (id, transaction_id, product_id, quantity, unit_price) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&detail_id)
            .bind(&header_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(unit_price)
            .execute(&mut *conn)
            .await?;

            sqlx::query("UPDATE products SET stock = stock + ? WHERE id = ?")
                .bind(movement.movement_type.stock_delta(item.quantity))
                .bind(&item.product_id)
                .execute(&mut *conn)
                .await?;

            total_value += Money::from_minor(unit_price).multiply_quantity(item.quantity);

            debug!(
                detail_id = %detail_id,
                product_id = %item.product_id,
                quantity = item.quantity,
                unit_price,
                "Detail inserted"
            );
        }

        Ok(RecordedMovement {
            id: header_id,
            movement_type: movement.movement_type,
            item_count: movement.items.len(),
            total_quantity: movement.total_quantity(),
            total_value,
        })
    }

    async fn header_id(
        &self,
        conn: &mut SqliteConnection,
        movement_type: MovementType,
    ) -> DbResult<String> {
        match self.id_scheme {
            IdScheme::Sequential => next_sequential_id(conn, "transactions", TRANSACTION_IDS).await,
            IdScheme::Random => {
                unused_random_id(conn, "transactions", IdScheme::random_header(movement_type)).await
            }
        }
    }

    async fn detail_id(&self, conn: &mut SqliteConnection) -> DbResult<String> {
        match self.id_scheme {
            IdScheme::Sequential => {
                next_sequential_id(conn, "transaction_details", DETAIL_IDS).await
            }
            IdScheme::Random => {
                unused_random_id(conn, "transaction_details", IdScheme::random_detail()).await
            }
        }
    }
}

// =============================================================================
// History
// =============================================================================

/// Read access to recorded movements.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Every detail line joined with its header, product, supplier and user
    /// names, newest movement first.
    pub async fn history(&self) -> DbResult<Vec<HistoryEntry>> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            "SELECT \
                t.id AS transaction_id, \
                t.transaction_type, \
                strftime('%Y-%m-%d %H:%M:%S', t.transaction_date) AS transaction_date, \
                t.note, \
                td.product_id, \
                p.name AS product_name, \
                td.quantity, \
                td.unit_price, \
                s.name AS supplier_name, \
                u.username, \
                t.user_id \
             FROM transactions t \
             JOIN transaction_details td ON td.transaction_id = t.id \
             JOIN products p ON p.id = td.product_id \
             LEFT JOIN suppliers s ON s.id = t.supplier_id \
             LEFT JOIN users u ON u.id = t.user_id \
             ORDER BY t.transaction_date DESC, t.rowid DESC, td.rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Gets one movement header.
    pub async fn get_header(&self, id: &str) -> DbResult<Option<TransactionHeader>> {
        let header = sqlx::query_as::<_, TransactionHeader>(
            "SELECT id, transaction_type, supplier_id, user_id, note, transaction_date \
             FROM transactions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(header)
    }

    /// Detail rows of one movement, in insertion order.
    pub async fn details(&self, transaction_id: &str) -> DbResult<Vec<TransactionDetail>> {
        let details = sqlx::query_as::<_, TransactionDetail>(
            "SELECT id, transaction_id, product_id, quantity, unit_price \
             FROM transaction_details WHERE transaction_id = ? ORDER BY rowid",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::{LineItem, NewProduct, NewUser, ProductUpdate, UserIdentity};

    async fn db_with(scheme: IdScheme) -> Database {
        let db = Database::new(DbConfig::in_memory().id_scheme(scheme))
            .await
            .unwrap();
        for (name, price, stock) in [("Kopi Bubuk", 25_000, 10), ("Teh Celup", 8_000, 3)] {
            db.products()
                .create(NewProduct {
                    name: name.to_string(),
                    unit_price: price,
                    stock,
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        db
    }

    async fn db() -> Database {
        db_with(IdScheme::Sequential).await
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    async fn row_count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    fn movement(kind: MovementType, lines: &[(&str, i64)]) -> NewStockMovement {
        NewStockMovement::new(
            kind,
            lines.iter().map(|(id, qty)| LineItem::new(*id, *qty)).collect(),
        )
    }

    #[tokio::test]
    async fn test_inbound_single_line() {
        let db = db().await;

        let recorded = db
            .recorder()
            .record(movement(MovementType::In, &[("P001", 5)]))
            .await
            .unwrap();

        assert_eq!(recorded.id, "T001");
        assert_eq!(recorded.movement_type, MovementType::In);
        assert_eq!(recorded.item_count, 1);
        assert_eq!(recorded.total_value, Money::from_minor(125_000));

        let header = db.transactions().get_header("T001").await.unwrap().unwrap();
        assert_eq!(header.transaction_type, MovementType::In);
        assert_eq!(header.user_id, None);

        let details = db.transactions().details("T001").await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].id, "TD001");
        assert_eq!(details[0].product_id, "P001");
        assert_eq!(details[0].quantity, 5);
        assert_eq!(details[0].unit_price, 25_000);

        assert_eq!(stock_of(&db, "P001").await, 15);
    }

    #[tokio::test]
    async fn test_outbound_decreases_by_summed_quantities() {
        let db = db().await;

        let recorded = db
            .recorder()
            .record(movement(MovementType::Out, &[("P001", 3), ("P001", 4), ("P002", 1)]))
            .await
            .unwrap();

        assert_eq!(recorded.total_quantity, 8);
        assert_eq!(stock_of(&db, "P001").await, 3);
        assert_eq!(stock_of(&db, "P002").await, 2);

        let ids: Vec<_> = db
            .transactions()
            .details(&recorded.id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["TD001", "TD002", "TD003"]);
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_price_change() {
        let db = db().await;
        db.recorder()
            .record(movement(MovementType::In, &[("P002", 2)]))
            .await
            .unwrap();

        db.products()
            .update(
                "P002",
                ProductUpdate {
                    unit_price: Some(9_500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let details = db.transactions().details("T001").await.unwrap();
        assert_eq!(details[0].unit_price, 8_000);
    }

    #[tokio::test]
    async fn test_empty_rows_write_nothing() {
        let db = db().await;

        let err = db
            .recorder()
            .record(movement(MovementType::In, &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert_eq!(row_count(&db, "transactions").await, 0);
        assert_eq!(row_count(&db, "transaction_details").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_everything() {
        let db = db().await;
        let history_before = db.transactions().history().await.unwrap();

        let err = db
            .recorder()
            .record(movement(MovementType::In, &[("P001", 5), ("P999", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(ref id)) if id == "P999"));
        assert_eq!(row_count(&db, "transactions").await, 0);
        assert_eq!(row_count(&db, "transaction_details").await, 0);
        assert_eq!(stock_of(&db, "P001").await, 10);
        assert_eq!(db.transactions().history().await.unwrap(), history_before);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back() {
        let db = db().await;

        let err = db
            .recorder()
            .record(movement(MovementType::Out, &[("P001", 2), ("P002", 4)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            })
        ));
        assert_eq!(stock_of(&db, "P001").await, 10);
        assert_eq!(row_count(&db, "transactions").await, 0);
    }

    #[tokio::test]
    async fn test_ids_continue_after_failed_movement() {
        let db = db().await;
        let recorder = db.recorder();

        recorder
            .record(movement(MovementType::In, &[("P001", 1)]))
            .await
            .unwrap();
        recorder
            .record(movement(MovementType::In, &[("P404", 1)]))
            .await
            .unwrap_err();
        let second = recorder
            .record(movement(MovementType::Out, &[("P001", 1)]))
            .await
            .unwrap();

        assert_eq!(second.id, "T002");
        assert_eq!(db.transactions().details("T002").await.unwrap()[0].id, "TD002");
    }

    #[tokio::test]
    async fn test_user_resolution() {
        let db = db().await;
        let budi = db
            .users()
            .register(NewUser {
                username: "budi".to_string(),
                email: "budi@example.com".to_string(),
                password: "rahasia".to_string(),
            })
            .await
            .unwrap();

        let cases = [
            (Some("budi"), None, Some(budi.id.clone())),
            (Some("ghost"), Some(budi.id.as_str()), Some(budi.id.clone())),
            (None, Some(budi.id.as_str()), Some(budi.id.clone())),
            (None, Some("zz99"), None),
            (Some("ghost"), None, None),
        ];

        for (username, user_id, expected) in cases {
            let mut m = movement(MovementType::In, &[("P001", 1)]);
            m.user = UserIdentity {
                username: username.map(str::to_string),
                user_id: user_id.map(str::to_string),
            };
            let recorded = db.recorder().record(m).await.unwrap();
            let header = db
                .transactions()
                .get_header(&recorded.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(header.user_id, expected, "username={username:?} user_id={user_id:?}");
        }
    }

    #[tokio::test]
    async fn test_supplier_and_note_fallbacks() {
        let db = db().await;

        let mut line = LineItem::new("P001", 1);
        line.supplier_id = Some("S002".to_string());
        line.note = Some("kiriman pagi".to_string());
        let inbound = db
            .recorder()
            .record(NewStockMovement::new(MovementType::In, vec![line.clone()]))
            .await
            .unwrap();
        let header = db.transactions().get_header(&inbound.id).await.unwrap().unwrap();
        assert_eq!(header.supplier_id.as_deref(), Some("S002"));
        assert_eq!(header.note, "kiriman pagi");

        let mut outbound = NewStockMovement::new(MovementType::Out, vec![line]);
        outbound.supplier_id = Some("S001".to_string());
        let outbound = db.recorder().record(outbound).await.unwrap();
        let header = db.transactions().get_header(&outbound.id).await.unwrap().unwrap();
        assert_eq!(header.supplier_id, None);
    }

    #[tokio::test]
    async fn test_unknown_supplier_is_foreign_key_violation() {
        let db = db().await;
        let mut m = movement(MovementType::In, &[("P001", 1)]);
        m.supplier_id = Some("S999".to_string());

        let err = db.recorder().record(m).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(row_count(&db, "transactions").await, 0);
    }

    #[tokio::test]
    async fn test_random_scheme() {
        let db = db_with(IdScheme::Random).await;

        let inbound = db
            .recorder()
            .record(movement(MovementType::In, &[("P001", 1), ("P002", 1)]))
            .await
            .unwrap();
        let outbound = db
            .recorder()
            .record(movement(MovementType::Out, &[("P001", 1)]))
            .await
            .unwrap();

        assert!(inbound.id.starts_with("TIN"));
        assert!(outbound.id.starts_with("TOUT"));
        for detail in db.transactions().details(&inbound.id).await.unwrap() {
            assert!(detail.id.starts_with("TD"));
            assert_eq!(detail.id.len(), 10);
        }
    }

    #[tokio::test]
    async fn test_history_joins_names_newest_first() {
        let db = db().await;
        let mut first = movement(MovementType::In, &[("P001", 5)]);
        first.supplier_id = Some("S001".to_string());
        db.recorder().record(first).await.unwrap();
        db.recorder()
            .record(movement(MovementType::Out, &[("P002", 1)]))
            .await
            .unwrap();

        let history = db.transactions().history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction_id, "T002");
        assert_eq!(history[0].product_name, "Teh Celup");
        assert_eq!(history[1].transaction_id, "T001");
        assert_eq!(history[1].supplier_name.as_deref(), Some("PT Sumber Makmur"));
        assert_eq!(history[1].transaction_date.len(), 19);
    }

    #[tokio::test]
    async fn test_concurrent_recorders_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("stock.db")))
            .await
            .unwrap();
        db.products()
            .create(NewProduct {
                name: "Kopi Bubuk".to_string(),
                unit_price: 25_000,
                ..Default::default()
            })
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let recorder = db.recorder();
            handles.push(tokio::spawn(async move {
                recorder
                    .record(movement(MovementType::In, &[("P001", 3)]))
                    .await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 10);
        assert_eq!(stock_of(&db, "P001").await, 30);
        assert_eq!(row_count(&db, "transaction_details").await, 10);
        db.close().await;
    }
}
