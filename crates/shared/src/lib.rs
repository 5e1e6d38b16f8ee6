//! Shared types, errors, and configuration for Medfin.
//!
//! This crate provides common types used across all other crates:
//! - Amount helpers with two-decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types and per-field validation errors
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult, FieldErrors};
