//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File size exceeds maximum allowed.
    #[error("Proof file must not exceed {max_mb}MB.")]
    FileTooLarge {
        /// Actual file size in bytes.
        size: usize,
        /// Limit in whole megabytes.
        max_mb: usize,
    },

    /// Not a PDF, JPEG, or PNG.
    #[error("Proof file must be a PDF or image file.")]
    InvalidFileType,

    /// File not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// True for errors caused by the uploaded file itself.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::FileTooLarge { .. } | Self::InvalidFileType)
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        let err = StorageError::FileTooLarge {
            size: 6 * 1024 * 1024,
            max_mb: 5,
        };
        assert_eq!(err.to_string(), "Proof file must not exceed 5MB.");
        assert!(err.is_rejection());
        assert_eq!(
            StorageError::InvalidFileType.to_string(),
            "Proof file must be a PDF or image file."
        );
        assert!(!StorageError::configuration("x").is_rejection());
    }
}
