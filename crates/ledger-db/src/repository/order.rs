//! # Order Repository
//!
//! Transactional order writes with customer reconciliation.
//!
//! ## Write Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     update(order), same shape for add/delete            │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │  ├── 1. read the stored order + line items     (the "old" snapshot)     │
//! │  ├── 2. write the order row                                             │
//! │  ├── 3. diff line items: delete removed, upsert the rest                │
//! │  ├── 4. reconcile payer balance/debt           (ledger-core, pure)      │
//! │  COMMIT                                                                 │
//! │  └── 5. notify: order, line, customer events   (never on rollback)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reconciliation runs inside the same transaction as the order write, so a
//! failure anywhere leaves both the order and the customer untouched. When an
//! update moves an order between customers, each side is reconciled with its
//! own single-sided step: the old payer only sees the revert, the new payer
//! only the deduction.

use std::collections::HashSet;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::event::{ChangeNotifier, ModelEvent};
use crate::repository::{map_order, CustomerRepository, OrderLineRepository};
use ledger_core::{Customer, Order, OrderLine};

/// Repository for transactional order writes.
#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier<Order>,
    customers: CustomerRepository,
    lines: OrderLineRepository,
}

impl OrderRepository {
    pub fn new(
        pool: SqlitePool,
        notifier: ChangeNotifier<Order>,
        customers: CustomerRepository,
        lines: OrderLineRepository,
    ) -> Self {
        OrderRepository {
            pool,
            notifier,
            customers,
            lines,
        }
    }

    /// The notifier consumers register change listeners on.
    pub fn notifier(&self) -> &ChangeNotifier<Order> {
        &self.notifier
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetches one order, hydrated with its payer snapshot and line items.
    pub async fn select_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query(
            "SELECT id, customer_id, status, payment_method, date, note \
             FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match row.as_ref().map(map_order).transpose()? {
            Some(order) => Ok(Some(Self::hydrate_with(&mut conn, order).await?)),
            None => Ok(None),
        }
    }

    /// Fetches all orders, hydrated, in insertion order.
    pub async fn select_all(&self) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(
            "SELECT id, customer_id, status, payment_method, date, note \
             FROM orders ORDER BY id",
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let order = Self::hydrate_with(&mut conn, map_order(row)?).await?;
            orders.push(order);
        }
        Ok(orders)
    }

    pub async fn is_exists_by_id(&self, id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn hydrate_with(conn: &mut SqliteConnection, mut order: Order) -> DbResult<Order> {
        if let Some(id) = order.id {
            order.line_items = OrderLineRepository::select_all_by_order_id_with(conn, id).await?;
        }
        if let Some(customer_id) = order.customer_id {
            order.customer = CustomerRepository::select_by_id_with(conn, customer_id).await?;
        }
        Ok(order)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new order with its line items and settles the payer.
    ///
    /// Line items are always inserted fresh; any ids on them are ignored.
    ///
    /// ## Returns
    /// The generated order id.
    pub async fn add(&self, order: &Order) -> DbResult<i64> {
        debug!(customer_id = ?order.customer_id, "Inserting order");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO orders (customer_id, status, payment_method, date, note) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order.customer_id)
        .bind(order.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(order.date)
        .bind(&order.note)
        .execute(&mut *tx)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM orders WHERE rowid = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&mut *tx)
            .await?;

        let mut inserted_lines = Vec::with_capacity(order.line_items.len());
        for line in &order.line_items {
            let line = OrderLine {
                id: None,
                ..line.clone()
            };
            inserted_lines.push(OrderLineRepository::upsert_with(&mut tx, id, &line).await?);
        }

        let stored = Order {
            id: Some(id),
            customer: None,
            line_items: inserted_lines,
            ..order.clone()
        };

        let mut reconciled = Vec::new();
        if let Some(customer_id) = stored.customer_id {
            let settled = Self::reconcile_with(&mut tx, customer_id, |customer| {
                customer
                    .with_balance(customer.balance_on_made_payment(&stored))
                    .with_debt(customer.debt_on_made_payment(&stored))
            })
            .await?;
            reconciled.extend(settled);
        }

        tx.commit().await?;

        // Re-hydrate so the event carries the resolved payer snapshot. A
        // concurrent delete between commit and re-read falls back to the
        // snapshot we wrote.
        let hydrated = self.select_by_id(id).await?.unwrap_or(stored.clone());

        self.lines
            .notify(ModelEvent::Upserted(stored.line_items.clone()));
        if !reconciled.is_empty() {
            self.customers.notify(ModelEvent::Updated(reconciled));
        }
        self.notifier.notify(ModelEvent::Added(vec![hydrated]));
        Ok(id)
    }

    /// Replaces a stored order and re-reconciles every affected payer.
    ///
    /// Line items are diffed against the stored ones: lines whose id is
    /// absent from the new list are deleted, the rest are upserted.
    ///
    /// ## Returns
    /// The number of affected order rows: 0 when the order does not exist,
    /// in which case nothing is written and no event is raised.
    pub async fn update(&self, order: &Order) -> DbResult<u64> {
        let Some(id) = order.id else {
            return Ok(0);
        };

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, customer_id, status, payment_method, date, note \
             FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(old) = row.as_ref().map(map_order).transpose()? else {
            return Ok(0);
        };
        let old = Self::hydrate_with(&mut tx, old).await?;

        debug!(id, old_customer_id = ?old.customer_id, new_customer_id = ?order.customer_id, "Updating order");

        let affected = sqlx::query(
            "UPDATE orders SET customer_id = ?, status = ?, payment_method = ?, \
                               date = ?, note = ? \
             WHERE id = ?",
        )
        .bind(order.customer_id)
        .bind(order.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(order.date)
        .bind(&order.note)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let kept_ids: HashSet<i64> = order.line_items.iter().filter_map(|line| line.id).collect();
        let removed: Vec<OrderLine> = old
            .line_items
            .iter()
            .filter(|line| line.id.map_or(true, |line_id| !kept_ids.contains(&line_id)))
            .cloned()
            .collect();
        OrderLineRepository::delete_all_with(&mut tx, &removed).await?;

        let mut upserted = Vec::with_capacity(order.line_items.len());
        for line in &order.line_items {
            upserted.push(OrderLineRepository::upsert_with(&mut tx, id, line).await?);
        }

        let stored = Order {
            id: Some(id),
            customer: None,
            line_items: upserted,
            ..order.clone()
        };

        let mut reconciled = Vec::new();
        if old.customer_id == stored.customer_id {
            // Same payer (or none): one composed revert-then-apply step.
            if let Some(customer_id) = stored.customer_id {
                let settled = Self::reconcile_with(&mut tx, customer_id, |customer| {
                    customer
                        .with_balance(customer.balance_on_updated_payment(&old, &stored))
                        .with_debt(customer.debt_on_updated_payment(&old, &stored))
                })
                .await?;
                reconciled.extend(settled);
            }
        } else {
            // Reassigned: the old payer gets the revert, the new payer the
            // deduction. Each step is gated by its own order's reference.
            if let Some(customer_id) = old.customer_id {
                let settled = Self::reconcile_with(&mut tx, customer_id, |customer| {
                    customer
                        .with_balance(customer.balance_on_reverted_payment(&old))
                        .with_debt(customer.debt_on_reverted_payment(&old))
                })
                .await?;
                reconciled.extend(settled);
            }
            if let Some(customer_id) = stored.customer_id {
                let settled = Self::reconcile_with(&mut tx, customer_id, |customer| {
                    customer
                        .with_balance(customer.balance_on_made_payment(&stored))
                        .with_debt(customer.debt_on_made_payment(&stored))
                })
                .await?;
                reconciled.extend(settled);
            }
        }

        tx.commit().await?;

        let hydrated = self.select_by_id(id).await?.unwrap_or(stored.clone());

        if !removed.is_empty() {
            self.lines.notify(ModelEvent::Deleted(removed));
        }
        if !stored.line_items.is_empty() {
            self.lines
                .notify(ModelEvent::Upserted(stored.line_items.clone()));
        }
        if !reconciled.is_empty() {
            self.customers.notify(ModelEvent::Updated(reconciled));
        }
        self.notifier.notify(ModelEvent::Updated(vec![hydrated]));
        Ok(affected)
    }

    /// Deletes an order, cascading to its line items, and reverts the
    /// payer's settlement.
    ///
    /// ## Returns
    /// The number of affected order rows: 0 when the order does not exist.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, customer_id, status, payment_method, date, note \
             FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(old) = row.as_ref().map(map_order).transpose()? else {
            return Ok(0);
        };
        let old = Self::hydrate_with(&mut tx, old).await?;

        debug!(id, customer_id = ?old.customer_id, "Deleting order");

        // Line rows go with the order via ON DELETE CASCADE.
        let affected = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut reconciled = Vec::new();
        if let Some(customer_id) = old.customer_id {
            let settled = Self::reconcile_with(&mut tx, customer_id, |customer| {
                customer
                    .with_balance(customer.balance_on_reverted_payment(&old))
                    .with_debt(customer.debt_on_reverted_payment(&old))
            })
            .await?;
            reconciled.extend(settled);
        }

        tx.commit().await?;

        if !old.line_items.is_empty() {
            self.lines
                .notify(ModelEvent::Deleted(old.line_items.clone()));
        }
        if !reconciled.is_empty() {
            self.customers.notify(ModelEvent::Updated(reconciled));
        }
        self.notifier.notify(ModelEvent::Deleted(vec![old]));
        Ok(affected)
    }

    /// Applies one reconciliation step to a stored payer snapshot.
    ///
    /// Returns the updated snapshot when the step changed anything; an
    /// unchanged payer is neither written nor reported.
    async fn reconcile_with<F>(
        conn: &mut SqliteConnection,
        customer_id: i64,
        step: F,
    ) -> DbResult<Option<Customer>>
    where
        F: FnOnce(&Customer) -> Customer,
    {
        let Some(customer) = CustomerRepository::select_by_id_with(conn, customer_id).await? else {
            return Ok(None);
        };
        let updated = step(&customer);
        if updated == customer {
            return Ok(None);
        }
        CustomerRepository::save_reconciled_with(conn, &updated).await?;
        Ok(Some(updated))
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::event::{EventKind, ModelChangedListener, ModelEvent};
    use crate::pool::{Database, DbConfig};
    use ledger_core::{Money, OrderStatus, PaymentMethod};

    async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, name: &str, balance: i64) -> i64 {
        let mut customer = Customer::new(name);
        customer.balance = Money::from_cents(balance);
        db.customers().add(&customer).await.unwrap()
    }

    fn line(price: i64, quantity: i64, discount: i64) -> OrderLine {
        OrderLine {
            id: None,
            order_id: None,
            product_id: None,
            product_name: Some("Apple".to_string()),
            product_price: Some(Money::from_cents(price)),
            quantity: Decimal::from(quantity),
            discount,
            total_price: Decimal::ZERO,
        }
        .with_calculated_total_price()
    }

    fn order(
        customer_id: Option<i64>,
        status: OrderStatus,
        method: PaymentMethod,
        lines: Vec<OrderLine>,
    ) -> Order {
        Order {
            id: None,
            customer_id,
            status,
            payment_method: method,
            date: Utc::now(),
            note: None,
            customer: None,
            line_items: lines,
        }
    }

    async fn stored_customer(db: &Database, id: i64) -> Customer {
        db.customers().select_by_id(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn add_settles_balance_and_hydrates_on_read() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 500).await;

        let order = order(
            Some(customer_id),
            OrderStatus::Completed,
            PaymentMethod::AccountBalance,
            vec![line(100, 2, 0)],
        );
        let order_id = db.orders().add(&order).await.unwrap();

        let stored = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(stored.line_items.len(), 1);
        assert_eq!(stored.grand_total(), Decimal::from(200));
        assert_eq!(stored.customer.as_ref().unwrap().name, "Amy");

        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 300);
        db.close().await;
    }

    #[tokio::test]
    async fn add_with_insufficient_balance_skips_settlement() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 100).await;

        let order = order(
            Some(customer_id),
            OrderStatus::Completed,
            PaymentMethod::AccountBalance,
            vec![line(500, 1, 0)],
        );
        db.orders().add(&order).await.unwrap();

        // No partial deduction.
        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 100);
        db.close().await;
    }

    #[tokio::test]
    async fn unpaid_order_accrues_and_releases_debt() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 0).await;

        let unpaid = order(
            Some(customer_id),
            OrderStatus::Unpaid,
            PaymentMethod::Cash,
            vec![line(250, 1, 0)],
        );
        let order_id = db.orders().add(&unpaid).await.unwrap();
        assert_eq!(
            stored_customer(&db, customer_id).await.debt,
            Decimal::from(-250)
        );

        // Settling the order releases the debt.
        let mut settled = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        settled.status = OrderStatus::Completed;
        settled.customer = None;
        let affected = db.orders().update(&settled).await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(stored_customer(&db, customer_id).await.debt, Decimal::ZERO);
        db.close().await;
    }

    #[tokio::test]
    async fn update_reprices_through_revert_then_apply() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 500).await;

        let order_id = db
            .orders()
            .add(&order(
                Some(customer_id),
                OrderStatus::Completed,
                PaymentMethod::AccountBalance,
                vec![line(200, 1, 0)],
            ))
            .await
            .unwrap();
        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 300);

        // Reprice 200 -> 350: revert to 500, re-apply leaves 150.
        let mut repriced = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        repriced.customer = None;
        repriced.line_items = vec![line(350, 1, 0)];
        db.orders().update(&repriced).await.unwrap();

        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 150);
        db.close().await;
    }

    #[tokio::test]
    async fn update_reassignment_reconciles_both_payers() {
        let db = database().await;
        let amy = seed_customer(&db, "Amy", 500).await;
        let ben = seed_customer(&db, "Ben", 400).await;

        let order_id = db
            .orders()
            .add(&order(
                Some(amy),
                OrderStatus::Completed,
                PaymentMethod::AccountBalance,
                vec![line(300, 1, 0)],
            ))
            .await
            .unwrap();
        assert_eq!(stored_customer(&db, amy).await.balance.cents(), 200);

        let mut reassigned = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        reassigned.customer = None;
        reassigned.customer_id = Some(ben);
        db.orders().update(&reassigned).await.unwrap();

        // Amy refunded, Ben charged.
        assert_eq!(stored_customer(&db, amy).await.balance.cents(), 500);
        assert_eq!(stored_customer(&db, ben).await.balance.cents(), 100);
        db.close().await;
    }

    #[tokio::test]
    async fn update_diffs_line_items() {
        let db = database().await;
        let order_id = db
            .orders()
            .add(&order(
                None,
                OrderStatus::Pending,
                PaymentMethod::Cash,
                vec![line(100, 1, 0), line(200, 1, 0)],
            ))
            .await
            .unwrap();

        let mut updated = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        // Keep the first stored line, drop the second, add a fresh one.
        let kept = updated.line_items[0].clone();
        updated.line_items = vec![kept.clone(), line(999, 1, 0)];
        db.orders().update(&updated).await.unwrap();

        let stored = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(stored.line_items.len(), 2);
        assert!(stored.line_items.iter().any(|l| l.id == kept.id));
        assert!(stored
            .line_items
            .iter()
            .any(|l| l.total_price == Decimal::from(999)));
        db.close().await;
    }

    #[tokio::test]
    async fn update_missing_order_is_a_no_op() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 500).await;

        let mut ghost = order(
            Some(customer_id),
            OrderStatus::Completed,
            PaymentMethod::AccountBalance,
            vec![line(100, 1, 0)],
        );
        ghost.id = Some(404);

        assert_eq!(db.orders().update(&ghost).await.unwrap(), 0);
        assert_eq!(db.orders().delete(404).await.unwrap(), 0);
        // Neither write touched the would-be payer.
        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 500);
        db.close().await;
    }

    #[tokio::test]
    async fn failed_update_rolls_back_every_row() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 500).await;

        let order_id = db
            .orders()
            .add(&order(
                Some(customer_id),
                OrderStatus::Completed,
                PaymentMethod::AccountBalance,
                vec![line(200, 1, 0)],
            ))
            .await
            .unwrap();
        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 300);

        // Settle earlier events before registering, so only the failed write
        // could produce one.
        db.orders().notifier().flush().await;
        let order_events = Recorder::<Order>::new();
        db.orders().notifier().register(order_events.clone());

        // A line referencing a nonexistent product violates the foreign key
        // AFTER the order row was rewritten inside the transaction.
        let mut poisoned = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        poisoned.customer = None;
        poisoned.note = Some("should never be stored".to_string());
        let mut bad_line = line(999, 1, 0);
        bad_line.product_id = Some(9999);
        poisoned.line_items = vec![bad_line];

        assert!(db.orders().update(&poisoned).await.is_err());

        // Everything rolled back together: order row, line items, payer.
        let stored = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(stored.note, None);
        assert_eq!(stored.grand_total(), Decimal::from(200));
        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 300);

        // No event for an aborted write.
        db.orders().notifier().flush().await;
        assert!(order_events.seen().is_empty());
        db.close().await;
    }

    #[tokio::test]
    async fn delete_reverts_settlement_and_cascades_lines() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 500).await;

        let order_id = db
            .orders()
            .add(&order(
                Some(customer_id),
                OrderStatus::Completed,
                PaymentMethod::AccountBalance,
                vec![line(200, 1, 0)],
            ))
            .await
            .unwrap();
        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 300);

        assert_eq!(db.orders().delete(order_id).await.unwrap(), 1);
        assert_eq!(stored_customer(&db, customer_id).await.balance.cents(), 500);
        assert!(db
            .order_lines()
            .select_all_by_order_id(order_id)
            .await
            .unwrap()
            .is_empty());
        db.close().await;
    }

    struct Recorder<M> {
        seen: Mutex<Vec<(EventKind, usize)>>,
        _marker: std::marker::PhantomData<fn(&M)>,
    }

    impl<M> Recorder<M> {
        fn new() -> Arc<Self> {
            Arc::new(Recorder {
                seen: Mutex::new(Vec::new()),
                _marker: std::marker::PhantomData,
            })
        }

        fn seen(&self) -> Vec<(EventKind, usize)> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl<M: Send + Sync> ModelChangedListener<M> for Recorder<M> {
        fn on_model_changed(&self, event: &ModelEvent<M>) {
            self.seen
                .lock()
                .unwrap()
                .push((event.kind(), event.models().len()));
        }
    }

    #[tokio::test]
    async fn writes_notify_after_commit_in_order() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 500).await;

        // Settle the seeding events before registering.
        db.customers().notifier().flush().await;
        let order_events = Recorder::<Order>::new();
        let customer_events = Recorder::<Customer>::new();
        db.orders().notifier().register(order_events.clone());
        db.customers().notifier().register(customer_events.clone());

        let order_id = db
            .orders()
            .add(&order(
                Some(customer_id),
                OrderStatus::Completed,
                PaymentMethod::AccountBalance,
                vec![line(100, 1, 0)],
            ))
            .await
            .unwrap();
        let mut updated = db.orders().select_by_id(order_id).await.unwrap().unwrap();
        updated.customer = None;
        updated.line_items = vec![line(150, 1, 0)];
        db.orders().update(&updated).await.unwrap();
        db.orders().delete(order_id).await.unwrap();
        db.orders().notifier().flush().await;

        assert_eq!(
            order_events.seen(),
            vec![
                (EventKind::Added, 1),
                (EventKind::Updated, 1),
                (EventKind::Deleted, 1),
            ]
        );
        // Each write also reconciled the payer.
        assert_eq!(
            customer_events.seen(),
            vec![
                (EventKind::Updated, 1),
                (EventKind::Updated, 1),
                (EventKind::Updated, 1),
            ]
        );
        db.close().await;
    }

    #[tokio::test]
    async fn no_event_for_unaffected_payer() {
        let db = database().await;
        let customer_id = seed_customer(&db, "Amy", 500).await;

        // Settle the seeding events before registering.
        db.customers().notifier().flush().await;
        let customer_events = Recorder::<Customer>::new();
        db.customers().notifier().register(customer_events.clone());

        // Cash + pending touches neither balance nor debt.
        db.orders()
            .add(&order(
                Some(customer_id),
                OrderStatus::Pending,
                PaymentMethod::Cash,
                vec![line(100, 1, 0)],
            ))
            .await
            .unwrap();
        db.customers().notifier().flush().await;

        assert!(customer_events.seen().is_empty());
        db.close().await;
    }
}
