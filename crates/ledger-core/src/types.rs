//! # Domain Types
//!
//! Core domain types for the ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │    Customer    │   │     Order      │   │   OrderLine    │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id            │   │  id            │   │  id            │      │
//! │  │  name          │   │  customer_id   │◄──│  order_id (FK) │      │
//! │  │  balance       │◄──│  status        │   │  product_id    │      │
//! │  │  debt          │   │  payment_method│   │  quantity      │      │
//! │  └────────────────┘   │  line_items    │   │  total_price   │      │
//! │                       └────────────────┘   └────────────────┘      │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │    Product     │   │  OrderStatus   │   │ PaymentMethod  │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id            │   │  Pending       │   │  Cash          │      │
//! │  │  name          │   │  InProcess     │   │  AccountBalance│      │
//! │  │  price         │   │  Unpaid        │   └────────────────┘      │
//! │  └────────────────┘   │  Completed     │                           │
//! │                       └────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Immutable Snapshots
//! Every mutation produces a new value: repositories are handed an "old" and
//! a "new" snapshot and never mutate an aggregate in place. Reconciliation
//! (see [`crate::reconcile`]) works exclusively on such snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Model Identity
// =============================================================================

/// Common identity accessor for persisted aggregates.
///
/// Ids are `Option<i64>`: `None` until storage assigns one on insert, then
/// stable for the lifetime of the row. The change-notification merge logic
/// keys on this.
pub trait Model {
    fn model_id(&self) -> Option<i64>;
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// Any status may transition to any other via an explicit update; there is no
/// enforced linear workflow. Only `Completed` and `Unpaid` carry
/// reconciliation side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been taken but work has not started.
    Pending,
    /// Order is being worked on.
    InProcess,
    /// Order was delivered but not paid; accrues customer debt.
    Unpaid,
    /// Order is done and settled.
    Completed,
}

impl OrderStatus {
    /// Stable text form, used as the storage column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProcess => "in_process",
            OrderStatus::Unpaid => "unpaid",
            OrderStatus::Completed => "completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "in_process" => Ok(OrderStatus::InProcess),
            "unpaid" => Ok(OrderStatus::Unpaid),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Paid from the customer's pre-paid account balance.
    AccountBalance,
}

impl PaymentMethod {
    /// Stable text form, used as the storage column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::AccountBalance => "account_balance",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "account_balance" => Ok(PaymentMethod::AccountBalance),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a cached pre-paid balance and outstanding debt.
///
/// ## Invariants
/// - `balance` never goes below zero; a reconciliation step that would drive
///   it negative is skipped entirely (see [`crate::reconcile`]).
/// - `debt` has no floor. It is stored as a negative number: counting the
///   grand totals of orders whose status is [`OrderStatus::Unpaid`], where
///   negative means "owed by the customer to the business".
///
/// Both fields are only ever adjusted by the reconciliation methods inside a
/// repository transaction, or set directly by an explicit user edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique ID. `None` for the value to be auto-generated on insert.
    pub id: Option<i64>,
    /// Customer name.
    pub name: String,
    /// Cached pre-paid balance in integer minor units, floored at zero.
    pub balance: Money,
    /// Cached outstanding debt, unfloored exact decimal.
    pub debt: Decimal,
}

impl Customer {
    /// Creates a customer with zero balance and debt.
    pub fn new(name: impl Into<String>) -> Self {
        Customer {
            id: None,
            name: name.into(),
            balance: Money::zero(),
            debt: Decimal::ZERO,
        }
    }

    /// Copy with a different balance. Snapshot-style update helper.
    pub fn with_balance(&self, balance: Money) -> Self {
        Customer {
            balance,
            ..self.clone()
        }
    }

    /// Copy with a different debt.
    pub fn with_debt(&self, debt: Decimal) -> Self {
        Customer {
            debt,
            ..self.clone()
        }
    }
}

impl Model for Customer {
    fn model_id(&self) -> Option<i64> {
        self.id
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product that order lines snapshot their name/price from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique ID. `None` for the value to be auto-generated on insert.
    pub id: Option<i64>,
    pub name: String,
    /// Unit price in integer minor units.
    pub price: Money,
}

impl Model for Product {
    fn model_id(&self) -> Option<i64> {
        self.id
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One priced, quantified entry within an order.
///
/// Product name and price are snapshots taken at order time: when the
/// referenced product is later deleted, `product_id` becomes null while the
/// snapshot fields are retained to preserve transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Unique ID. `None` for the value to be auto-generated on insert.
    pub id: Option<i64>,
    /// Referenced order ID from [`Order::id`].
    pub order_id: Option<i64>,
    /// Referenced product ID from [`Product::id`], null once that product is
    /// deleted.
    pub product_id: Option<i64>,
    /// Product name snapshot.
    pub product_name: Option<String>,
    /// Product unit price snapshot.
    pub product_price: Option<Money>,
    /// Ordered quantity; may be fractional (e.g. sold by weight).
    pub quantity: Decimal,
    /// Flat discount in integer minor units.
    pub discount: i64,
    /// Line total. Use [`OrderLine::calculate_total_price`] to compute it.
    pub total_price: Decimal,
}

impl OrderLine {
    /// Computes `max(0, product_price * quantity - discount)`.
    ///
    /// A missing price snapshot yields zero. Negative totals are disallowed;
    /// a discount larger than the line value clamps to zero.
    pub fn calculate_total_price(&self) -> Decimal {
        let total = match self.product_price {
            Some(price) => price.to_decimal() * self.quantity - Decimal::from(self.discount),
            None => Decimal::ZERO,
        };
        total.max(Decimal::ZERO)
    }

    /// Copy with the total price recomputed from the other fields.
    pub fn with_calculated_total_price(&self) -> Self {
        OrderLine {
            total_price: self.calculate_total_price(),
            ..self.clone()
        }
    }

    /// The discount as a percentage of the undiscounted line value, rounded
    /// to two decimal places.
    pub fn discount_percent(&self) -> Decimal {
        let without_discount = self.total_price + Decimal::from(self.discount);
        if without_discount.is_zero() {
            // Prevent zero division.
            return Decimal::ZERO;
        }
        ((Decimal::from(self.discount) * Decimal::ONE_HUNDRED) / without_discount)
            .round_dp(2)
            .normalize()
    }

    /// Rebuilds the referenced product from the snapshot fields, if the
    /// snapshot is complete. `product_id` stays null when the actual product
    /// has been deleted from the database.
    pub fn referenced_product(&self) -> Option<Product> {
        let name = self.product_name.clone()?;
        let price = self.product_price?;
        Some(Product {
            id: self.product_id,
            name,
            price,
        })
    }
}

impl Model for OrderLine {
    fn model_id(&self) -> Option<i64> {
        self.id
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer transaction with a status, payment method, date and line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique ID. `None` for the value to be auto-generated on insert.
    pub id: Option<i64>,
    /// Referenced customer ID from [`Customer::id`]; null when no customer is
    /// attached (or the customer was deleted).
    pub customer_id: Option<i64>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
    /// Referenced customer instance if [`Order::customer_id`] is available;
    /// hydrated by the repository on read, not persisted on this row.
    pub customer: Option<Customer>,
    /// Ordered line items, hydrated by the repository on read.
    pub line_items: Vec<OrderLine>,
}

impl Order {
    /// Sum of all line-item totals.
    pub fn grand_total(&self) -> Decimal {
        self.line_items.iter().map(|line| line.total_price).sum()
    }

    /// Sum of all line-item discounts.
    pub fn total_discount(&self) -> Decimal {
        self.line_items
            .iter()
            .map(|line| Decimal::from(line.discount))
            .sum()
    }

    /// The settlement condition: only a completed order paid from the account
    /// balance affects the customer's cached balance.
    pub fn settles_from_balance(&self) -> bool {
        self.status == OrderStatus::Completed
            && self.payment_method == PaymentMethod::AccountBalance
    }

    /// Whether this order accrues customer debt.
    pub fn accrues_debt(&self) -> bool {
        self.status == OrderStatus::Unpaid
    }
}

impl Model for Order {
    fn model_id(&self) -> Option<i64> {
        self.id
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: Decimal, discount: i64) -> OrderLine {
        OrderLine {
            id: None,
            order_id: None,
            product_id: Some(1),
            product_name: Some("Apple".to_string()),
            product_price: Some(Money::from_cents(price)),
            quantity,
            discount,
            total_price: Decimal::ZERO,
        }
        .with_calculated_total_price()
    }

    #[test]
    fn test_status_text_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::InProcess,
            OrderStatus::Unpaid,
            OrderStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("voided".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_method_text_round_trip() {
        for method in [PaymentMethod::Cash, PaymentMethod::AccountBalance] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("card".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_calculate_total_price() {
        // 100 * 2.5 - 50 = 200
        let line = line(100, Decimal::new(25, 1), 50);
        assert_eq!(line.total_price, Decimal::from(200));
    }

    #[test]
    fn test_total_price_clamped_at_zero() {
        // Discount exceeds the line value.
        let line = line(100, Decimal::ONE, 500);
        assert_eq!(line.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_total_price_zero_without_price_snapshot() {
        let line = OrderLine {
            id: None,
            order_id: None,
            product_id: None,
            product_name: None,
            product_price: None,
            quantity: Decimal::TEN,
            discount: 0,
            total_price: Decimal::ZERO,
        };
        assert_eq!(line.calculate_total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_discount_percent() {
        // 100 * 4 = 400, discount 100 -> total 300, 100/400 = 25%
        let line = line(100, Decimal::from(4), 100);
        assert_eq!(line.discount_percent(), Decimal::from(25));

        let free = line.clone();
        let free = OrderLine {
            total_price: Decimal::ZERO,
            discount: 0,
            ..free
        };
        assert_eq!(free.discount_percent(), Decimal::ZERO);
    }

    #[test]
    fn test_referenced_product_survives_product_deletion() {
        let mut item = line(250, Decimal::ONE, 0);
        item.product_id = None; // Product deleted; snapshot retained.

        let product = item.referenced_product().unwrap();
        assert_eq!(product.id, None);
        assert_eq!(product.name, "Apple");
        assert_eq!(product.price, Money::from_cents(250));
    }

    #[test]
    fn test_grand_total_sums_line_items() {
        let order = Order {
            id: Some(1),
            customer_id: None,
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Cash,
            date: Utc::now(),
            note: None,
            customer: None,
            line_items: vec![line(100, Decimal::ONE, 0), line(250, Decimal::from(2), 100)],
        };
        // 100 + (500 - 100) = 500
        assert_eq!(order.grand_total(), Decimal::from(500));
        assert_eq!(order.total_discount(), Decimal::from(100));
    }

    #[test]
    fn test_settlement_condition() {
        let mut order = Order {
            id: Some(1),
            customer_id: Some(1),
            status: OrderStatus::Completed,
            payment_method: PaymentMethod::AccountBalance,
            date: Utc::now(),
            note: None,
            customer: None,
            line_items: vec![],
        };
        assert!(order.settles_from_balance());
        assert!(!order.accrues_debt());

        order.payment_method = PaymentMethod::Cash;
        assert!(!order.settles_from_balance());

        order.status = OrderStatus::Unpaid;
        assert!(order.accrues_debt());
    }
}
