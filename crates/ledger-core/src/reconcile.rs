//! # Reconciliation Module
//!
//! Pure functions that keep a customer's cached `balance` and `debt`
//! consistent with the lifecycle of the orders referencing them.
//!
//! ## Settlement Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                When does an order touch a customer?                 │
//! │                                                                     │
//! │  balance  ◄── status == Completed && payment == AccountBalance     │
//! │  debt     ◄── status == Unpaid                                     │
//! │  nothing  ◄── every other status/method combination                │
//! │                                                                     │
//! │  ...and only when order.customer_id == customer.id.                │
//! │  A null or mismatched reference means no effect.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Balance/Debt Asymmetry
//! Balance is floored at zero: a deduction that would drive it negative is
//! skipped entirely, silently. Debt has no floor and moves unconditionally.
//! This asymmetry is intentional business behavior, not a defect.
//!
//! All functions here are total, take value snapshots, and perform no I/O.
//! Repositories call them inside the write transaction (see `ledger-db`).

use rust_decimal::Decimal;

use crate::money::Money;
use crate::types::{Customer, Order};

impl Customer {
    /// Whether this customer is the one the order references.
    ///
    /// Unsaved customers (`id == None`) pay for nothing.
    fn is_payer_of(&self, order: &Order) -> bool {
        matches!((self.id, order.customer_id), (Some(id), Some(payer)) if id == payer)
    }

    /// Calculate balance when the customer is assigned to pay an order.
    ///
    /// An insufficient balance silently blocks the deduction and leaves the
    /// balance unchanged. That is a business rule, not an error: callers who
    /// need to warn the user check [`Customer::is_balance_sufficient`] first.
    pub fn balance_on_made_payment(&self, order: &Order) -> Money {
        if self.is_payer_of(order)
            && order.settles_from_balance()
            && self.balance.to_decimal() >= order.grand_total()
        {
            Money::from_decimal(self.balance.to_decimal() - order.grand_total())
        } else {
            self.balance
        }
    }

    /// Calculate balance when going to revert the payment, like when deleting
    /// an order.
    ///
    /// Unconditional: reverting assumes the amount was previously deducted.
    pub fn balance_on_reverted_payment(&self, order: &Order) -> Money {
        if self.is_payer_of(order) && order.settles_from_balance() {
            Money::from_decimal(self.balance.to_decimal() + order.grand_total())
        } else {
            self.balance
        }
    }

    /// Calculate balance when an order changed from `old_order` to
    /// `new_order`.
    ///
    /// Composition of the two single-sided steps: first revert the old
    /// order's settlement, then re-apply the new one. Each half is gated by
    /// its own order's customer reference, so invoking this once per affected
    /// customer handles reassignment correctly: the old customer only sees
    /// the revert, the new customer only sees the deduction.
    pub fn balance_on_updated_payment(&self, old_order: &Order, new_order: &Order) -> Money {
        let reverted = self.balance_on_reverted_payment(old_order);
        self.with_balance(reverted).balance_on_made_payment(new_order)
    }

    /// Check whether the balance would cover `new_order` once `old_order`'s
    /// settlement is undone.
    ///
    /// Used while editing an already completed-and-settled order, to decide
    /// whether account balance may still be offered as the payment method.
    pub fn is_balance_sufficient(&self, old_order: Option<&Order>, new_order: &Order) -> bool {
        let projected = match old_order {
            Some(old_order) => self.balance_on_reverted_payment(old_order),
            None => self.balance,
        };
        projected.to_decimal() >= new_order.grand_total()
    }

    /// Calculate debt when the customer is assigned to pay an order.
    ///
    /// Debt is counted negative ("owed to the business") and has no floor.
    pub fn debt_on_made_payment(&self, order: &Order) -> Decimal {
        if self.is_payer_of(order) && order.accrues_debt() {
            self.debt - order.grand_total()
        } else {
            self.debt
        }
    }

    /// Calculate debt when going to revert the payment, like when deleting an
    /// order.
    pub fn debt_on_reverted_payment(&self, order: &Order) -> Decimal {
        if self.is_payer_of(order) && order.accrues_debt() {
            self.debt + order.grand_total()
        } else {
            self.debt
        }
    }

    /// Calculate debt when an order changed from `old_order` to `new_order`.
    ///
    /// Same two-step composition as [`Customer::balance_on_updated_payment`].
    pub fn debt_on_updated_payment(&self, old_order: &Order, new_order: &Order) -> Decimal {
        let reverted = self.debt_on_reverted_payment(old_order);
        self.with_debt(reverted).debt_on_made_payment(new_order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
