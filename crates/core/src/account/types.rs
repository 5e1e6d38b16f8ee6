//! Ledger account types.

use medfin_shared::types::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::HierarchyError;

/// Maximum length of an account code.
pub const MAX_CODE_LEN: usize = 20;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Net position.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses an account type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structural part of an account: what the hierarchy checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNode {
    /// Account ID.
    pub id: AccountId,
    /// Unique dotted code, e.g. `5.1.2.01`.
    pub code: String,
    /// Parent account, `None` for roots.
    pub parent_id: Option<AccountId>,
    /// Depth in the tree, roots are level 1.
    pub level: i32,
}

/// Checks the shape of an account code: dot-separated runs of ASCII digits.
pub fn validate_code(code: &str) -> Result<(), HierarchyError> {
    let invalid = || HierarchyError::InvalidCode(code.to_string());

    if code.is_empty() || code.len() > MAX_CODE_LEN {
        return Err(invalid());
    }
    if code
        .split('.')
        .any(|segment| segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }
    Ok(())
}
