//! Budget data types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Budget type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    /// Allocation set at the start of the fiscal year.
    Initial,
    /// Reallocation between lines during the year.
    Shifting,
    /// Revised allocation.
    Revised,
}

impl BudgetType {
    /// All budget types.
    pub const ALL: [Self; 3] = [Self::Initial, Self::Shifting, Self::Revised];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Shifting => "shifting",
            Self::Revised => "revised",
        }
    }

    /// Parses a budget type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "initial" => Some(Self::Initial),
            "shifting" => Some(Self::Shifting),
            "revised" => Some(Self::Revised),
            _ => None,
        }
    }
}

impl fmt::Display for BudgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
