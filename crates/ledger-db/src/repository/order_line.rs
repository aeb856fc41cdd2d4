//! # Order Line Repository
//!
//! Database operations for the line items of an order.
//!
//! Line items never change outside an order write, so every mutation here is
//! a `*_with` method joining the [`super::OrderRepository`] transaction. Only
//! reads run against the pool directly.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use crate::event::{ChangeNotifier, ModelEvent};
use crate::repository::map_order_line;
use ledger_core::OrderLine;

/// Repository for order-line database operations.
#[derive(Clone)]
pub struct OrderLineRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier<OrderLine>,
}

impl OrderLineRepository {
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier<OrderLine>) -> Self {
        OrderLineRepository { pool, notifier }
    }

    /// The notifier consumers register change listeners on.
    pub fn notifier(&self) -> &ChangeNotifier<OrderLine> {
        &self.notifier
    }

    pub async fn select_all_by_order_id(&self, order_id: i64) -> DbResult<Vec<OrderLine>> {
        let mut conn = self.pool.acquire().await?;
        Self::select_all_by_order_id_with(&mut conn, order_id).await
    }

    pub(crate) async fn select_all_by_order_id_with(
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query(
            "SELECT id, order_id, product_id, product_name, product_price, \
                    quantity, discount, total_price \
             FROM order_line WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.iter().map(map_order_line).collect()
    }

    /// Inserts or replaces one line inside an order write's transaction.
    ///
    /// A line without an id is inserted and comes back with the generated
    /// one; a line with an id replaces the stored row.
    pub(crate) async fn upsert_with(
        conn: &mut SqliteConnection,
        order_id: i64,
        line: &OrderLine,
    ) -> DbResult<OrderLine> {
        let result = sqlx::query(
            "INSERT INTO order_line \
                 (id, order_id, product_id, product_name, product_price, \
                  quantity, discount, total_price) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET \
                 order_id = excluded.order_id, \
                 product_id = excluded.product_id, \
                 product_name = excluded.product_name, \
                 product_price = excluded.product_price, \
                 quantity = excluded.quantity, \
                 discount = excluded.discount, \
                 total_price = excluded.total_price",
        )
        .bind(line.id)
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.product_price.map(|price| price.cents()))
        .bind(line.quantity.to_string())
        .bind(line.discount)
        .bind(line.total_price.to_string())
        .execute(&mut *conn)
        .await?;

        let id = match line.id {
            Some(id) => id,
            None => {
                sqlx::query_scalar("SELECT id FROM order_line WHERE rowid = ?")
                    .bind(result.last_insert_rowid())
                    .fetch_one(&mut *conn)
                    .await?
            }
        };

        Ok(OrderLine {
            id: Some(id),
            order_id: Some(order_id),
            ..line.clone()
        })
    }

    /// Deletes the given lines inside an order write's transaction. Lines
    /// without an id are skipped.
    pub(crate) async fn delete_all_with(
        conn: &mut SqliteConnection,
        lines: &[OrderLine],
    ) -> DbResult<()> {
        for line in lines {
            if let Some(id) = line.id {
                sqlx::query("DELETE FROM order_line WHERE id = ?")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
            }
        }
        Ok(())
    }

    /// Forwards a post-commit event raised by the order repository.
    pub(crate) fn notify(&self, event: ModelEvent<OrderLine>) {
        self.notifier.notify(event);
    }
}
