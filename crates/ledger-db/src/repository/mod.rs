//! # Repository Module
//!
//! Database repositories for the ledger entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Write Path Through a Repository                     │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  db.orders().update(&order)                                     │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── BEGIN                                                              │
//! │  ├── write order + line items                                           │
//! │  ├── reconcile customer balance/debt   (ledger-core, pure)              │
//! │  ├── COMMIT                                                             │
//! │  └── notify listeners                  (only after commit)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`] - Customer CRUD and cached balance/debt writes
//! - [`ProductRepository`] - Product CRUD
//! - [`OrderLineRepository`] - Line-item reads and transaction-scoped writes
//! - [`OrderRepository`] - Transactional order writes with reconciliation
//!
//! Sub-repositories expose `*_with` variants taking a `&mut SqliteConnection`
//! so they can join a transaction owned by [`OrderRepository`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{DbError, DbResult};
use ledger_core::{Customer, Money, Order, OrderLine, OrderStatus, PaymentMethod, Product};

pub mod customer;
pub mod order;
pub mod order_line;
pub mod product;

pub use customer::CustomerRepository;
pub use order::OrderRepository;
pub use order_line::OrderLineRepository;
pub use product::ProductRepository;

// =============================================================================
// Row Mapping
// =============================================================================
//
// Queries are built at runtime, so each repository maps its rows through the
// helpers below. Decimal columns are stored as TEXT and parsed on read; a
// value the domain cannot parse surfaces as `DbError::CorruptColumn` rather
// than a silent zero.

fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|err| DbError::corrupt_column(column, err.to_string()))
}

pub(crate) fn map_customer(row: &SqliteRow) -> DbResult<Customer> {
    let debt: String = row.try_get("debt")?;
    Ok(Customer {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        balance: Money::from_cents(row.try_get("balance")?),
        debt: parse_decimal("customer.debt", &debt)?,
    })
}

pub(crate) fn map_product(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        price: Money::from_cents(row.try_get("price")?),
    })
}

pub(crate) fn map_order_line(row: &SqliteRow) -> DbResult<OrderLine> {
    let quantity: String = row.try_get("quantity")?;
    let total_price: String = row.try_get("total_price")?;
    Ok(OrderLine {
        id: Some(row.try_get("id")?),
        order_id: Some(row.try_get("order_id")?),
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        product_price: row
            .try_get::<Option<i64>, _>("product_price")?
            .map(Money::from_cents),
        quantity: parse_decimal("order_line.quantity", &quantity)?,
        discount: row.try_get("discount")?,
        total_price: parse_decimal("order_line.total_price", &total_price)?,
    })
}

/// Maps the scalar order columns. Customer and line items are hydrated
/// separately by [`OrderRepository`].
pub(crate) fn map_order(row: &SqliteRow) -> DbResult<Order> {
    let status: String = row.try_get("status")?;
    let payment_method: String = row.try_get("payment_method")?;
    Ok(Order {
        id: Some(row.try_get("id")?),
        customer_id: row.try_get("customer_id")?,
        status: OrderStatus::from_str(&status)
            .map_err(|err| DbError::corrupt_column("orders.status", err))?,
        payment_method: PaymentMethod::from_str(&payment_method)
            .map_err(|err| DbError::corrupt_column("orders.payment_method", err))?,
        date: row.try_get::<DateTime<Utc>, _>("date")?,
        note: row.try_get("note")?,
        customer: None,
        line_items: Vec::new(),
    })
}
