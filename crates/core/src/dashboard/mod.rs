//! Dashboard aggregation.
//!
//! This module provides:
//! - Input rows (approved ledger activity and budget allocations)
//! - The pure aggregation engine
//! - The dashboard view-model types

pub mod engine;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::DashboardEngine;
pub use types::*;
