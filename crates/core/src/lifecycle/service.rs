//! State transitions and the locked-record guard.

use chrono::Utc;
use medfin_shared::types::UserId;

use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::types::{LifecycleAction, Mutation, RecordKind, RecordStatus};

/// Pure guard run before any mutation of a financial record.
pub struct LifecycleGuard;

impl LifecycleGuard {
    /// False for locked records, true otherwise.
    #[must_use]
    pub fn can_modify(status: RecordStatus) -> bool {
        !status.is_locked()
    }

    /// Refuses `mutation` on a locked record with a user-facing message.
    pub fn ensure_modifiable(
        status: RecordStatus,
        kind: RecordKind,
        mutation: Mutation,
    ) -> Result<(), LifecycleError> {
        if Self::can_modify(status) {
            Ok(())
        } else {
            Err(LifecycleError::Locked { kind, mutation })
        }
    }
}

/// Stateless service validating lifecycle transitions.
pub struct LifecycleService;

impl LifecycleService {
    /// Approve a draft record, stamping approver and time.
    pub fn approve(
        current_status: RecordStatus,
        approved_by: UserId,
    ) -> Result<LifecycleAction, LifecycleError> {
        match current_status {
            RecordStatus::Draft => Ok(LifecycleAction::Approve {
                new_status: RecordStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(LifecycleError::InvalidTransition {
                from: current_status,
                to: RecordStatus::Approved,
            }),
        }
    }

    /// Lock a draft or approved record.
    pub fn lock(current_status: RecordStatus) -> Result<LifecycleAction, LifecycleError> {
        match current_status {
            RecordStatus::Draft | RecordStatus::Approved => Ok(LifecycleAction::Lock {
                new_status: RecordStatus::Locked,
            }),
            RecordStatus::Locked => Err(LifecycleError::InvalidTransition {
                from: current_status,
                to: RecordStatus::Locked,
            }),
        }
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: RecordStatus, to: RecordStatus) -> bool {
        matches!(
            (from, to),
            (RecordStatus::Draft, RecordStatus::Approved | RecordStatus::Locked)
                | (RecordStatus::Approved, RecordStatus::Locked)
        )
    }
}
