//! # Dashboard Repository
//!
//! Read-only aggregates for the dashboard page.
//!
//! | Method | Feeds |
//! |---|---|
//! | [`DashboardRepository::summary`] | headline cards + "nearly empty" list |
//! | [`DashboardRepository::weekly_transactions`] | weekly bar chart |
//! | [`DashboardRepository::top_items`] | most moved products, per direction |
//! | [`DashboardRepository::low_stock`] | restock alert banner |
//!
//! Week numbers follow SQLite's `%W` (Monday-based, 00-53). "Today" and
//! "this year" are evaluated in UTC, the same clock `CURRENT_TIMESTAMP`
//! uses when movements are stored.

use sqlx::SqlitePool;
use stockroom_core::{
    DashboardSummary, ItemTotal, Money, MovementType, StockLevel, TopItems, WeeklyCount,
    DASHBOARD_LIST_LIMIT, LOW_STOCK_ALERT_THRESHOLD, NEARLY_EMPTY_THRESHOLD,
};

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Catalog counts, stock totals, today's movements and the products
    /// closest to running out.
    pub async fn summary(&self) -> DbResult<DashboardSummary> {
        let (product_count, category_count, supplier_count, total_stock, total_value, today): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM products), \
                (SELECT COUNT(*) FROM categories), \
                (SELECT COUNT(*) FROM suppliers), \
                (SELECT COALESCE(SUM(stock), 0) FROM products), \
                (SELECT COALESCE(SUM(unit_price * stock), 0) FROM products), \
                (SELECT COUNT(*) FROM transactions \
                  WHERE date(transaction_date) = date('now'))",
        )
        .fetch_one(&self.pool)
        .await?;

        let nearly_empty = sqlx::query_as::<_, StockLevel>(
            "SELECT id, name, stock FROM products \
             WHERE stock < ? ORDER BY stock ASC, id ASC LIMIT ?",
        )
        .bind(NEARLY_EMPTY_THRESHOLD)
        .bind(DASHBOARD_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardSummary {
            product_count,
            category_count,
            supplier_count,
            total_stock,
            total_value: Money::from_minor(total_value),
            transactions_today: today,
            nearly_empty,
        })
    }

    /// Movement counts per week of the current year, ascending by week.
    pub async fn weekly_transactions(&self) -> DbResult<Vec<WeeklyCount>> {
        let weeks = sqlx::query_as::<_, WeeklyCount>(
            "SELECT CAST(strftime('%W', transaction_date) AS INTEGER) AS week, \
                    COUNT(*) AS count \
             FROM transactions \
             WHERE strftime('%Y', transaction_date) = strftime('%Y', 'now') \
             GROUP BY week \
             ORDER BY week ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(weeks)
    }

    /// The most moved products in each direction.
    pub async fn top_items(&self) -> DbResult<TopItems> {
        Ok(TopItems {
            outbound: self.top_for(MovementType::Out).await?,
            inbound: self.top_for(MovementType::In).await?,
        })
    }

    async fn top_for(&self, movement_type: MovementType) -> DbResult<Vec<ItemTotal>> {
        let items = sqlx::query_as::<_, ItemTotal>(
            "SELECT p.id AS product_id, p.name, SUM(td.quantity) AS total \
             FROM transaction_details td \
             JOIN transactions t ON t.id = td.transaction_id \
             JOIN products p ON p.id = td.product_id \
             WHERE t.transaction_type = ? \
             GROUP BY p.id, p.name \
             ORDER BY total DESC, p.id ASC \
             LIMIT ?",
        )
        .bind(movement_type)
        .bind(DASHBOARD_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Products below the alert threshold, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<StockLevel>> {
        let items = sqlx::query_as::<_, StockLevel>(
            "SELECT id, name, stock FROM products WHERE stock < ? ORDER BY stock ASC, id ASC",
        )
        .bind(LOW_STOCK_ALERT_THRESHOLD)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::{LineItem, NewProduct, NewStockMovement};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = [
            ("Kopi Bubuk", 25_000, 40),
            ("Teh Celup", 8_000, 9),
            ("Gula Pasir", 15_000, 2),
            ("Garam", 4_000, 0),
        ];
        for (name, price, stock) in catalog {
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

    async fn record(db: &Database, kind: MovementType, lines: &[(&str, i64)]) {
        let items = lines.iter().map(|(id, q)| LineItem::new(*id, *q)).collect();
        db.recorder()
            .record(NewStockMovement::new(kind, items))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_summary() {
        let db = seeded().await;
        record(&db, MovementType::Out, &[("P001", 5)]).await;

        let summary = db.dashboard().summary().await.unwrap();
        assert_eq!(summary.product_count, 4);
        assert_eq!(summary.category_count, 5);
        assert_eq!(summary.supplier_count, 3);
        assert_eq!(summary.total_stock, 35 + 9 + 2);
        assert_eq!(
            summary.total_value.minor(),
            35 * 25_000 + 9 * 8_000 + 2 * 15_000
        );
        assert_eq!(summary.transactions_today, 1);

        let nearly: Vec<_> = summary.nearly_empty.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(nearly, vec!["P004", "P003", "P002"]);
    }

    #[tokio::test]
    async fn test_summary_on_empty_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let summary = db.dashboard().summary().await.unwrap();
        assert_eq!(summary.product_count, 0);
        assert_eq!(summary.total_value, Money::zero());
        assert!(summary.nearly_empty.is_empty());
    }

    #[tokio::test]
    async fn test_weekly_transactions_counts_this_year() {
        let db = seeded().await;
        record(&db, MovementType::In, &[("P001", 1)]).await;
        record(&db, MovementType::In, &[("P002", 1)]).await;

        // Last year's movement is not counted.
        sqlx::query(
            "INSERT INTO transactions (id, transaction_type, transaction_date) \
             VALUES ('T900', 'IN', datetime('now', '-1 year'))",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let weeks = db.dashboard().weekly_transactions().await.unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].count, 2);
    }

    #[tokio::test]
    async fn test_top_items_per_direction() {
        let db = seeded().await;
        record(&db, MovementType::In, &[("P002", 10), ("P003", 4)]).await;
        record(&db, MovementType::In, &[("P003", 7)]).await;
        record(&db, MovementType::Out, &[("P001", 6)]).await;

        let top = db.dashboard().top_items().await.unwrap();
        let inbound: Vec<_> = top
            .inbound
            .iter()
            .map(|i| (i.product_id.as_str(), i.total))
            .collect();
        assert_eq!(inbound, vec![("P003", 11), ("P002", 10)]);
        assert_eq!(top.outbound.len(), 1);
        assert_eq!(top.outbound[0].name, "Kopi Bubuk");
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = seeded().await;
        let low: Vec<_> = db
            .dashboard()
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.id, s.stock))
            .collect();
        assert_eq!(low, vec![("P004".to_string(), 0), ("P003".to_string(), 2)]);
    }
}
