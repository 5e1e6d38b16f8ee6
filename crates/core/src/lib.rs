//! Core business logic for Medfin.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `account` - Chart of accounts hierarchy and code rules
//! - `unit` - Organizational (hospital) units
//! - `budget` - Budget records and utilization
//! - `transaction` - Transaction validation and listing filters
//! - `lifecycle` - Draft / approved / locked state machine and guard
//! - `numbering` - Reference number format and sequencing
//! - `dashboard` - Aggregation engine and view-model
//! - `storage` - Proof document storage

pub mod account;
pub mod budget;
pub mod dashboard;
pub mod lifecycle;
pub mod numbering;
pub mod storage;
pub mod transaction;
pub mod unit;
pub mod validation;
