//! Chart of accounts: account types, code rules, and the hierarchy table.

pub mod error;
pub mod input;
pub mod tree;
pub mod types;

#[cfg(test)]
mod tree_props;

pub use error::HierarchyError;
pub use input::{AccountForm, AccountInput};
pub use tree::AccountTree;
pub use types::{AccountNode, AccountType, MAX_CODE_LEN, validate_code};
