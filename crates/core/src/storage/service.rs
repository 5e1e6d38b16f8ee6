//! Proof store implementation using Apache OpenDAL.

use medfin_shared::config::{StorageBackend, StorageSettings};
use medfin_shared::types::TransactionId;
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::error::StorageError;

const MIB: usize = 1024 * 1024;

/// Accepted proof document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind {
    /// `application/pdf`
    Pdf,
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
}

impl ProofKind {
    /// MIME type.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Detects the format from the leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else {
            None
        }
    }

    /// Whether `filename` carries an extension for this format.
    #[must_use]
    pub fn matches_extension(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        match self {
            Self::Pdf => ext == "pdf",
            Self::Jpeg => ext == "jpg" || ext == "jpeg",
            Self::Png => ext == "png",
        }
    }
}

/// Object store for transaction proof documents.
#[derive(Clone)]
pub struct ProofStore {
    operator: Operator,
    max_file_size: usize,
}

impl std::fmt::Debug for ProofStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofStore")
            .field("scheme", &self.operator.info().scheme())
            .field("max_file_size", &self.max_file_size)
            .finish()
    }
}

impl ProofStore {
    /// Create a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let operator = match settings.backend {
            StorageBackend::Fs => {
                let builder = services::Fs::default().root(&settings.root);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageBackend::S3 => {
                let bucket = settings
                    .bucket
                    .as_deref()
                    .ok_or_else(|| StorageError::configuration("s3 backend requires a bucket"))?;
                let mut builder = services::S3::default().bucket(bucket).root(&settings.root);
                if let Some(region) = &settings.region {
                    builder = builder.region(region);
                }
                if let Some(endpoint) = &settings.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(key) = &settings.access_key_id {
                    builder = builder.access_key_id(key);
                }
                if let Some(secret) = &settings.secret_access_key {
                    builder = builder.secret_access_key(secret);
                }
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(Self {
            operator,
            max_file_size: settings.max_file_size,
        })
    }

    /// Maximum accepted size in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Checks size, content, and extension of an upload.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or type is invalid.
    pub fn validate_upload(&self, filename: &str, bytes: &[u8]) -> Result<ProofKind, StorageError> {
        if bytes.len() > self.max_file_size {
            return Err(StorageError::FileTooLarge {
                size: bytes.len(),
                max_mb: self.max_file_size.div_ceil(MIB),
            });
        }
        match ProofKind::sniff(bytes) {
            Some(kind) if kind.matches_extension(filename) => Ok(kind),
            _ => Err(StorageError::InvalidFileType),
        }
    }

    /// Storage key for a proof of `transaction_id`.
    ///
    /// Format: `transactions/{transaction_id}/{uuid}-{sanitized_filename}`
    #[must_use]
    pub fn storage_key(transaction_id: TransactionId, filename: &str) -> String {
        format!(
            "transactions/{}/{}-{}",
            transaction_id,
            Uuid::new_v4().simple(),
            sanitize_filename(filename)
        )
    }

    /// Validates and writes a proof document, returning its storage key.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the write fails.
    pub async fn store(
        &self,
        transaction_id: TransactionId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.validate_upload(filename, &bytes)?;
        let key = Self::storage_key(transaction_id, filename);
        self.operator.write(&key, bytes).await?;
        Ok(key)
    }

    /// Reads a stored document.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        Ok(self.operator.read(key).await?.to_vec())
    }

    /// Delete a file from storage.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
