//! `SeaORM` entity definitions.

pub mod prelude;

pub mod budgets;
pub mod ledger_accounts;
pub mod organizational_units;
pub mod reference_sequences;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;
