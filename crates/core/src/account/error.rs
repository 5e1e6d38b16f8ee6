//! Account hierarchy errors.

use medfin_shared::types::AccountId;
use thiserror::Error;

/// Violations of the chart-of-accounts invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// Code is empty, too long, or not dotted digits.
    #[error("Invalid account code: {0}")]
    InvalidCode(String),

    /// Code already used by another account.
    #[error("Account code already exists: {0}")]
    DuplicateCode(String),

    /// Id already present in the table.
    #[error("Account {0} already exists")]
    DuplicateId(AccountId),

    /// Referenced account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Parent account does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Level does not equal parent level + 1 (or 1 for roots).
    #[error("Account level must be {expected}, got {got}")]
    LevelMismatch {
        /// Required level.
        expected: i32,
        /// Supplied level.
        got: i32,
    },

    /// The account would become its own ancestor.
    #[error("Account {id} cannot be placed under {parent}: it would become its own ancestor")]
    Cycle {
        /// Moved account.
        id: AccountId,
        /// Requested parent.
        parent: AccountId,
    },
}

impl HierarchyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCode(_) => "INVALID_ACCOUNT_CODE",
            Self::DuplicateCode(_) | Self::DuplicateId(_) => "DUPLICATE_ACCOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::LevelMismatch { .. } => "LEVEL_MISMATCH",
            Self::Cycle { .. } => "ACCOUNT_CYCLE",
        }
    }
}
