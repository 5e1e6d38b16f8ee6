//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - The schema migration

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountError, AccountFilter, AccountRepository, BudgetError, BudgetFilter, BudgetRepository,
    BudgetRow, DashboardError, DashboardRepository, SequenceError, SequenceRepository,
    TransactionError, TransactionRepository, TransactionRow, UnitError, UnitRepository, UserError,
    UserRepository,
};

use std::time::Duration;

use medfin_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the configured limits.
///
/// `SQLite` connections wait up to `busy_timeout_secs` for the write lock
/// instead of failing at once.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    let busy_timeout = Duration::from_secs(config.busy_timeout_secs);
    options.map_sqlx_sqlite_opts(move |opts| opts.busy_timeout(busy_timeout));
    Database::connect(options).await
}
