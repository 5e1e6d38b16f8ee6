//! Record lifecycle for transactions and budgets.
//!
//! Both record kinds share the draft → approved → locked status machine and
//! the rule that a locked record is never modified again.
//!
//! # Modules
//!
//! - `types` - Status, record kind, mutation kind, lifecycle actions
//! - `error` - Lifecycle error types
//! - `service` - State transitions and the modification guard

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LifecycleError;
pub use service::{LifecycleGuard, LifecycleService};
pub use types::{LifecycleAction, Mutation, RecordKind, RecordStatus};
