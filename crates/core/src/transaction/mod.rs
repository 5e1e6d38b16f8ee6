//! Transaction types, write-boundary validation, and listing filters.

pub mod filter;
pub mod input;
pub mod types;

pub use filter::{TransactionFilter, TransactionQuery};
pub use input::{DESCRIPTION_MAX_CHARS, TransactionForm, TransactionInput};
pub use types::TransactionType;
