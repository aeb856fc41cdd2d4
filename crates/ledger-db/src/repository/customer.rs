//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Two Kinds of Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Direct edits        add() / update() / delete()                        │
//! │                      Own their transaction, emit their own event.       │
//! │                      update() may set balance and debt directly         │
//! │                      (manual correction by the user).                   │
//! │                                                                         │
//! │  Reconciled writes   save_reconciled_with()                             │
//! │                      Joins an order write's transaction; the order      │
//! │                      repository emits the customer event after its      │
//! │                      own commit.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::event::{ChangeNotifier, ModelEvent};
use crate::repository::map_customer;
use ledger_core::Customer;

/// Repository for customer database operations.
#[derive(Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier<Customer>,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier<Customer>) -> Self {
        CustomerRepository { pool, notifier }
    }

    /// The notifier consumers register change listeners on.
    pub fn notifier(&self) -> &ChangeNotifier<Customer> {
        &self.notifier
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn select_all(&self) -> DbResult<Vec<Customer>> {
        let rows = sqlx::query("SELECT id, name, balance, debt FROM customer ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_customer).collect()
    }

    pub async fn select_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        Self::select_by_id_with(&mut conn, id).await
    }

    /// Fetches several customers at once; ids without a row are skipped.
    pub async fn select_by_ids(&self, ids: &[i64]) -> DbResult<Vec<Customer>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, name, balance, debt FROM customer WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(map_customer).collect()
    }

    pub async fn is_exists_by_id(&self, id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customer WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Transaction-joining read, used by the order repository to fetch payer
    /// snapshots inside its own write transaction.
    pub(crate) async fn select_by_id_with(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> DbResult<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, balance, debt FROM customer WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(map_customer).transpose()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a customer and returns the generated id.
    pub async fn add(&self, customer: &Customer) -> DbResult<i64> {
        debug!(name = %customer.name, "Inserting customer");

        let result = sqlx::query("INSERT INTO customer (name, balance, debt) VALUES (?, ?, ?)")
            .bind(&customer.name)
            .bind(customer.balance.cents())
            .bind(customer.debt.to_string())
            .execute(&self.pool)
            .await?;

        // AUTOINCREMENT pk equals rowid, but resolve it explicitly so the
        // mapping stays correct if the pk definition ever changes.
        let id: i64 = sqlx::query_scalar("SELECT id FROM customer WHERE rowid = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;

        let inserted = Customer {
            id: Some(id),
            ..customer.clone()
        };
        self.notifier.notify(ModelEvent::Added(vec![inserted]));
        Ok(id)
    }

    /// Updates a customer row, including direct balance/debt edits.
    ///
    /// ## Returns
    /// The number of affected rows: 0 when the id does not exist.
    pub async fn update(&self, customer: &Customer) -> DbResult<u64> {
        let id = customer
            .id
            .ok_or_else(|| DbError::not_found("Customer", "unsaved"))?;

        let result =
            sqlx::query("UPDATE customer SET name = ?, balance = ?, debt = ? WHERE id = ?")
                .bind(&customer.name)
                .bind(customer.balance.cents())
                .bind(customer.debt.to_string())
                .bind(id)
                .execute(&self.pool)
                .await?;

        let affected = result.rows_affected();
        if affected > 0 {
            self.notifier
                .notify(ModelEvent::Updated(vec![customer.clone()]));
        }
        Ok(affected)
    }

    /// Deletes a customer. Their orders survive with `customer_id` nulled by
    /// the schema's `ON DELETE SET NULL`.
    ///
    /// The snapshot read and the delete share one transaction, so the
    /// `Deleted` event always carries the row as it was at deletion.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let Some(deleted) = Self::select_by_id_with(&mut tx, id).await? else {
            return Ok(0);
        };

        let affected = sqlx::query("DELETE FROM customer WHERE id = ?")
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

    /// Persists reconciled balance/debt inside an order write's transaction.
    ///
    /// Deliberately event-silent: the owning order repository emits the
    /// customer `Updated` event after its transaction commits.
    pub(crate) async fn save_reconciled_with(
        conn: &mut SqliteConnection,
        customer: &Customer,
    ) -> DbResult<()> {
        let id = customer
            .id
            .ok_or_else(|| DbError::not_found("Customer", "unsaved"))?;

        sqlx::query("UPDATE customer SET balance = ?, debt = ? WHERE id = ?")
            .bind(customer.balance.cents())
            .bind(customer.debt.to_string())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Forwards a post-commit event raised by the order repository.
    pub(crate) fn notify(&self, event: ModelEvent<Customer>) {
        self.notifier.notify(event);
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
