//! Lifecycle error types.

use thiserror::Error;

use crate::lifecycle::types::{Mutation, RecordKind, RecordStatus};

/// Errors raised by lifecycle transitions and the modification guard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: RecordStatus,
        /// The attempted target status.
        to: RecordStatus,
    },

    /// Attempted to mutate a locked record.
    #[error("Cannot {mutation} locked {kind}.")]
    Locked {
        /// Record kind.
        kind: RecordKind,
        /// Refused mutation.
        mutation: Mutation,
    },
}

impl LifecycleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Locked { .. } => "RECORD_LOCKED",
        }
    }
}
