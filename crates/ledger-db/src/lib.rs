//! # ledger-db: Storage Layer for the Ledger
//!
//! SQLite persistence for the ledger domain, with transactional order writes
//! and typed post-commit change notifications.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ledger Data Flow                                │
//! │                                                                         │
//! │  Caller (UI, service, test)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    ledger-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │    │
//! │  │   │   Database    │   │  Repositories  │   │    Events    │    │    │
//! │  │   │   (pool.rs)   │   │ (order, ...)   │   │  (event.rs)  │    │    │
//! │  │   │               │   │                │   │              │    │    │
//! │  │   │ SqlitePool    │◄──│ BEGIN..COMMIT  │──►│ post-commit  │    │    │
//! │  │   │ + notifiers   │   │ + reconcile    │   │ fan-out      │    │    │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘    │    │
//! │  │              │                                                  │    │
//! │  │              │  pure balance/debt math                          │    │
//! │  │              ▼                                                  │    │
//! │  │        ledger-core                                              │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL, foreign keys on)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, repository wiring, lifecycle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`event`] - Change-notification fan-out
//! - [`sync`] - Incremental cache maintenance for event consumers
//! - [`repository`] - Repository implementations (order, customer, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/ledger.db")).await?;
//!
//! db.orders().notifier().register(my_listener);
//! let id = db.orders().add(&order).await?;
//!
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod event;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sync;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use event::{ChangeNotifier, EventKind, ListenerId, ModelChangedListener, ModelEvent};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{CustomerRepository, OrderLineRepository, OrderRepository, ProductRepository};
