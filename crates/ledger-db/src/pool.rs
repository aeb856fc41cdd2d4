//! # Database Pool Management
//!
//! Connection pool creation, configuration, and repository wiring.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Database Handle                                  │
//! │                                                                         │
//! │  DbConfig::new(path) ← Configure pool settings                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations             │
//! │       │                                                                 │
//! │       ├── SqlitePool (WAL, foreign keys on)                             │
//! │       ├── NotificationExecutor (ONE delivery task)                      │
//! │       ├── ChangeNotifier per entity type, all on that executor          │
//! │       └── Repositories wired over pool + notifiers                      │
//! │                                                                         │
//! │  db.orders() / db.customers() / db.products() / db.order_lines()        │
//! │                                                                         │
//! │  db.close() ← flush pending events, drain listeners, close pool         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Database` value is the single owner of the event plumbing. There is
//! no global registry: drop every clone and the whole stack is gone.
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers, writers don't block readers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::event::{ChangeNotifier, NotificationExecutor};
use crate::migrations;
use crate::repository::{
    CustomerRepository, OrderLineRepository, OrderRepository, ProductRepository,
};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/ledger.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a local single-user app)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it
    ///   doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::new(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Owns the connection pool, the shared notification executor, and one
/// [`ChangeNotifier`] per entity type. Repositories are wired once at
/// construction; clones of `Database` share everything.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    executor: NotificationExecutor,
    customers: CustomerRepository,
    products: ProductRepository,
    order_lines: OrderLineRepository,
    orders: OrderRepository,
}

impl Database {
    /// Creates a new database handle.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL mode, NORMAL synchronous, foreign keys on
    /// 3. Creates the connection pool and runs migrations (if enabled)
    /// 4. Spawns the notification executor and wires the repositories
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError)` - Connection or migration failed
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path?mode=rwc creates the file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: safe from corruption, may lose the last
            // transaction on a crash
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off for backwards compatibility;
            // the cascade/set-null lifecycle rules depend on them
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        // One executor, shared by every notifier: events of all entity types
        // are delivered strictly one at a time, in commit order.
        let executor = NotificationExecutor::spawn();
        let customers =
            CustomerRepository::new(pool.clone(), ChangeNotifier::new(executor.clone()));
        let products = ProductRepository::new(pool.clone(), ChangeNotifier::new(executor.clone()));
        let order_lines =
            OrderLineRepository::new(pool.clone(), ChangeNotifier::new(executor.clone()));
        let orders = OrderRepository::new(
            pool.clone(),
            ChangeNotifier::new(executor.clone()),
            customers.clone(),
            order_lines.clone(),
        );

        Ok(Database {
            pool,
            executor,
            customers,
            products,
            order_lines,
            orders,
        })
    }

    /// Runs database migrations.
    ///
    /// Automatically called by `new()` unless disabled in the config.
    /// Idempotent: safe to run multiple times.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// ## Usage
    /// For advanced queries not covered by repositories.
    /// Prefer using repository methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the order repository.
    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }

    /// Returns the customer repository.
    pub fn customers(&self) -> &CustomerRepository {
        &self.customers
    }

    /// Returns the product repository.
    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    /// Returns the order-line repository.
    pub fn order_lines(&self) -> &OrderLineRepository {
        &self.order_lines
    }

    /// Closes the database: delivers pending events, drains every listener
    /// registry, then closes the connection pool.
    ///
    /// After closing, repository operations fail and events go nowhere.
    pub async fn close(&self) {
        info!("Closing database");
        self.executor.flush().await;
        self.customers.notifier().close();
        self.products.notifier().close();
        self.order_lines.notifier().close();
        self.orders.notifier().close();
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        let db = Database::new(config).await.unwrap();

        assert!(db.health_check().await);
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();

        let (total, applied) = crate::migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        db.close().await;
    }

    #[tokio::test]
    async fn test_migration_status_fails_on_unmigrated_database() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        // No bookkeeping table yet; status must surface that, not report 0.
        assert!(crate::migrations::migration_status(db.pool()).await.is_err());
        db.close().await;
    }
}
