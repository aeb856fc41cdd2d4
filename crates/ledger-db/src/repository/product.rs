//! # Product Repository
//!
//! Database operations for products.
//!
//! Order lines snapshot a product's name and price at write time, so edits
//! and deletions here never rewrite history: a deleted product leaves its
//! line references nulled (`ON DELETE SET NULL`) with the snapshots intact.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::event::{ChangeNotifier, ModelEvent};
use crate::repository::map_product;
use ledger_core::Product;

/// Repository for product database operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier<Product>,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier<Product>) -> Self {
        ProductRepository { pool, notifier }
    }

    /// The notifier consumers register change listeners on.
    pub fn notifier(&self) -> &ChangeNotifier<Product> {
        &self.notifier
    }

    pub async fn select_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, price FROM product ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_product).collect()
    }

    pub async fn select_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price FROM product WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_product).transpose()
    }

    pub async fn is_exists_by_id(&self, id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM product WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Inserts a product and returns the generated id.
    pub async fn add(&self, product: &Product) -> DbResult<i64> {
        debug!(name = %product.name, "Inserting product");

        let result = sqlx::query("INSERT INTO product (name, price) VALUES (?, ?)")
            .bind(&product.name)
            .bind(product.price.cents())
            .execute(&self.pool)
            .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM product WHERE rowid = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;

        let inserted = Product {
            id: Some(id),
            ..product.clone()
        };
        self.notifier.notify(ModelEvent::Added(vec![inserted]));
        Ok(id)
    }

    /// Updates a product row.
    ///
    /// ## Returns
    /// The number of affected rows: 0 when the id does not exist.
    pub async fn update(&self, product: &Product) -> DbResult<u64> {
        let id = product
            .id
            .ok_or_else(|| DbError::not_found("Product", "unsaved"))?;

        let result = sqlx::query("UPDATE product SET name = ?, price = ? WHERE id = ?")
            .bind(&product.name)
            .bind(product.price.cents())
            .bind(id)
            .execute(&self.pool)
            .await?;

        let affected = result.rows_affected();
        if affected > 0 {
            self.notifier
                .notify(ModelEvent::Updated(vec![product.clone()]));
        }
        Ok(affected)
    }

    /// Deletes a product. The snapshot read and the delete share one
    /// transaction, so the `Deleted` event always carries the row as it was
    /// at deletion.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, name, price FROM product WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(deleted) = row.as_ref().map(map_product).transpose()? else {
            return Ok(0);
        };

        let affected = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        if affected > 0 {
            self.notifier.notify(ModelEvent::Deleted(vec![deleted]));
        }
        Ok(affected)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::event::{EventKind, ModelChangedListener};
    use crate::pool::{Database, DbConfig};
    use ledger_core::Money;

    struct Recorder {
        seen: Mutex<Vec<(EventKind, Product)>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Recorder {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<(EventKind, Product)> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl ModelChangedListener<Product> for Recorder {
        fn on_model_changed(&self, event: &ModelEvent<Product>) {
            let mut seen = self.seen.lock().unwrap();
            for model in event.models() {
                seen.push((event.kind(), model.clone()));
            }
        }
    }

    fn apple(price: i64) -> Product {
        Product {
            id: None,
            name: "Apple".to_string(),
            price: Money::from_cents(price),
        }
    }

    #[tokio::test]
    async fn crud_round_trip_with_events() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let recorder = Recorder::new();
        db.products().notifier().register(recorder.clone());

        let id = db.products().add(&apple(100)).await.unwrap();
        let repriced = Product {
            id: Some(id),
            ..apple(150)
        };
        assert_eq!(db.products().update(&repriced).await.unwrap(), 1);
        assert_eq!(
            db.products().select_by_id(id).await.unwrap().unwrap().price,
            Money::from_cents(150)
        );

        assert_eq!(db.products().delete(id).await.unwrap(), 1);
        assert_eq!(db.products().delete(id).await.unwrap(), 0);
        db.products().notifier().flush().await;

        let seen = recorder.seen();
        assert_eq!(seen.len(), 3);
        // The deleted snapshot reflects the reprice, not the insert.
        assert_eq!(seen[2].0, EventKind::Deleted);
        assert_eq!(seen[2].1.price, Money::from_cents(150));
        db.close().await;
    }
}
