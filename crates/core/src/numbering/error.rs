//! Reference number errors.

use thiserror::Error;

/// Failures while parsing or advancing a reference number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceError {
    /// Text is not `{PREFIX}-{YYYYMMDD}-{digits}`.
    #[error("Malformed reference number: {0}")]
    Malformed(String),

    /// Sequence counter cannot advance further.
    #[error("Reference sequence exhausted for bucket {0}")]
    Exhausted(String),
}
