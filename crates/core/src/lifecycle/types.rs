//! Lifecycle domain types.

use chrono::{DateTime, Utc};
use medfin_shared::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a transaction or a budget.
///
/// The valid transitions are:
/// - Draft → Approved (approve)
/// - Draft → Locked (lock)
/// - Approved → Locked (lock)
///
/// Locked is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Freshly created, freely editable, not counted in aggregates.
    Draft,
    /// Approved; counted in aggregates, still editable.
    Approved,
    /// Immutable.
    Locked,
}

impl RecordStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Draft, Self::Approved, Self::Locked];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Locked => "locked",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "locked" => Some(Self::Locked),
            _ => None,
        }
    }

    /// Returns true if the record is immutable.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked)
    }

    /// Returns true if the record counts toward aggregates.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which kind of financial record a lifecycle operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A ledger transaction.
    Transaction,
    /// A budget line.
    Budget,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transaction => "transaction",
            Self::Budget => "budget",
        })
    }
}

/// A mutation the guard may refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Opening a record for editing.
    Edit,
    /// Writing new field values.
    Update,
    /// Removing the record.
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edit => "edit",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// A validated state transition with its audit data.
#[derive(Debug, Clone)]
pub enum LifecycleAction {
    /// Draft record approved.
    Approve {
        /// The new status after approval.
        new_status: RecordStatus,
        /// The user who approved the record.
        approved_by: UserId,
        /// When the record was approved.
        approved_at: DateTime<Utc>,
    },
    /// Record locked.
    Lock {
        /// The new status after locking.
        new_status: RecordStatus,
    },
}

impl LifecycleAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> RecordStatus {
        match self {
            Self::Approve { new_status, .. } | Self::Lock { new_status } => *new_status,
        }
    }
}
