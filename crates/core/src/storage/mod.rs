//! Proof document storage using Apache OpenDAL.
//!
//! Proof documents (scanned receipts, invoices) are attached to transactions
//! and kept in vendor-agnostic object storage:
//! - S3-compatible: AWS S3, MinIO, Cloudflare R2
//! - Local filesystem (development)
//!
//! Only the storage key is persisted on the transaction row.

mod error;
mod service;

pub use error::StorageError;
pub use service::{ProofKind, ProofStore, sanitize_filename};
