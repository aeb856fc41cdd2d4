//! # ledger-core: Pure Business Logic for the Ledger
//!
//! This crate is the **heart** of the ledger. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Ledger Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  Embedding Application                        │ │
//! │  │        screens, lists, charts — external collaborators        │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ ledger-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────────┐        │ │
//! │  │  │  types  │ │  money  │ │ reconcile │ │ validation │        │ │
//! │  │  │Customer │ │  Money  │ │ balance/  │ │   rules    │        │ │
//! │  │  │  Order  │ │ Decimal │ │ debt math │ │   checks   │        │ │
//! │  │  └─────────┘ └─────────┘ └───────────┘ └────────────┘        │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                 ledger-db (Database Layer)                    │ │
//! │  │       SQLite repositories, transactions, change fan-out       │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Order, OrderLine, Product)
//! - [`money`] - Integer minor-unit money type (no floating point!)
//! - [`reconcile`] - Balance/debt reconciliation over order snapshots
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: reconciliation is deterministic and total
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Exact Money**: integer minor units for balances, exact decimals for
//!    debt and totals — floats never touch money
//! 4. **Immutable Snapshots**: updates are expressed as old/new value pairs
//!
//! ## Example Usage
//!
//! ```rust
//! use ledger_core::money::Money;
//! use ledger_core::types::{Customer, Order, OrderStatus, PaymentMethod};
//! use chrono::Utc;
//!
//! let customer = Customer {
//!     id: Some(1),
//!     name: "Amy".into(),
//!     balance: Money::from_cents(500),
//!     debt: rust_decimal::Decimal::ZERO,
//! };
//! let order = Order {
//!     id: Some(1),
//!     customer_id: Some(1),
//!     status: OrderStatus::Completed,
//!     payment_method: PaymentMethod::AccountBalance,
//!     date: Utc::now(),
//!     note: None,
//!     customer: None,
//!     line_items: vec![],
//! };
//!
//! // An empty order settles for zero; the balance is untouched.
//! assert_eq!(customer.balance_on_made_payment(&order).cents(), 500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use ledger_core::Money` instead of
// `use ledger_core::money::Money`

pub use error::{ValidationError, ValidationResult};
pub use money::Money;
pub use types::*;
