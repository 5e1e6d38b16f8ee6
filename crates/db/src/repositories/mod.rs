//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod budget;
pub mod dashboard;
pub mod sequence;
pub mod transaction;
pub mod unit;
pub mod user;

pub use account::{AccountError, AccountFilter, AccountRepository};
pub use budget::{BudgetError, BudgetFilter, BudgetRepository, BudgetRow};
pub use dashboard::{DashboardError, DashboardRepository};
pub use sequence::{SequenceError, SequenceRepository};
pub use transaction::{TransactionError, TransactionRepository, TransactionRow};
pub use unit::{UnitError, UnitRepository};
pub use user::{UserError, UserRepository};

use medfin_shared::FieldErrors;
use medfin_shared::types::{AccountId, UnitId};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, RuntimeErr,
    SqlErr,
};

use crate::entities::{ledger_accounts, organizational_units};

/// True when the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when the error is a foreign key violation.
pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

/// True when the database refused the statement because another writer
/// holds the lock: `SQLite` busy or locked (extended codes included) and
/// Postgres serialization failures or deadlocks.
pub(crate) fn is_lock_contention(err: &DbErr) -> bool {
    let (DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime)) = err else {
        return false;
    };
    let RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)) = runtime else {
        return false;
    };
    matches!(
        db.code().as_deref(),
        Some("5" | "6" | "261" | "262" | "517" | "40001" | "40P01")
    )
}

/// Checks that the referenced account and unit exist.
///
/// Missing rows become field errors keyed like the write forms.
pub(crate) async fn check_references<C: ConnectionTrait>(
    conn: &C,
    account_id: AccountId,
    unit_id: UnitId,
) -> Result<FieldErrors, DbErr> {
    let mut errors = FieldErrors::new();

    let accounts = ledger_accounts::Entity::find()
        .filter(ledger_accounts::Column::Id.eq(account_id.into_inner()))
        .count(conn)
        .await?;
    if accounts == 0 {
        errors.add("account_id", "Selected BAS Account is invalid.");
    }

    let units = organizational_units::Entity::find()
        .filter(organizational_units::Column::Id.eq(unit_id.into_inner()))
        .count(conn)
        .await?;
    if units == 0 {
        errors.add("unit_id", "Selected Hospital Unit is invalid.");
    }

    Ok(errors)
}
