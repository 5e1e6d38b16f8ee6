//! Entity re-exports.

pub use super::budgets::Entity as Budgets;
pub use super::ledger_accounts::Entity as LedgerAccounts;
pub use super::organizational_units::Entity as OrganizationalUnits;
pub use super::reference_sequences::Entity as ReferenceSequences;
pub use super::transactions::Entity as Transactions;
pub use super::users::Entity as Users;
