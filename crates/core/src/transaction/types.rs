//! Transaction domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numbering::prefix_for;

/// What a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
    /// Money returned.
    Return,
    /// Adjustment of an earlier entry.
    Correction,
}

impl TransactionType {
    /// All transaction types.
    pub const ALL: [Self; 4] = [Self::Income, Self::Expense, Self::Return, Self::Correction];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Return => "return",
            Self::Correction => "correction",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "return" => Some(Self::Return),
            "correction" => Some(Self::Correction),
            _ => None,
        }
    }

    /// Reference number prefix for this type.
    #[must_use]
    pub fn reference_prefix(&self) -> &'static str {
        prefix_for(self.as_str())
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
