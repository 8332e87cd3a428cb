//! Categories and suppliers.
//!
//! Both lists are reference data: the HTTP surface only reads them. They are
//! filled by migration `002_reference_data.sql` and the `seed` binary, which
//! uses the upsert methods below.

use sqlx::SqlitePool;
use stockroom_core::{Category, Supplier};

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// All categories, ordered by id.
    pub async fn categories(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All suppliers, ordered by id.
    pub async fn suppliers(&self) -> DbResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, address FROM suppliers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Inserts or renames a category.
    pub async fn upsert_category(&self, category: &Category) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO categories (id, name) VALUES (?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = excluded.name",
        )
        .bind(&category.id)
        .bind(&category.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or updates a supplier.
    pub async fn upsert_supplier(&self, supplier: &Supplier) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO suppliers (id, name, contact, address) VALUES (?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET \
                name = excluded.name, \
                contact = excluded.contact, \
                address = excluded.address",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_reference_data_present() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories.first().map(|c| c.id.as_str()), Some("C001"));

        let suppliers = catalog.suppliers().await.unwrap();
        assert_eq!(suppliers.len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_supplier() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let mut supplier = Supplier {
            id: "S010".to_string(),
            name: "Toko Grosir Murah".to_string(),
            contact: None,
            address: Some("Medan".to_string()),
        };
        catalog.upsert_supplier(&supplier).await.unwrap();
        supplier.contact = Some("061-5551010".to_string());
        catalog.upsert_supplier(&supplier).await.unwrap();

        let suppliers = catalog.suppliers().await.unwrap();
        assert_eq!(suppliers.len(), 4);
        assert_eq!(suppliers.last(), Some(&supplier));
    }

    #[tokio::test]
    async fn test_upsert_category_renames() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        catalog
            .upsert_category(&Category {
                id: "C001".to_string(),
                name: "Makanan Ringan".to_string(),
            })
            .await
            .unwrap();

        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories[0].name, "Makanan Ringan");
        assert_eq!(categories.len(), 5);
    }
}
