//! Budget planning records (RBA) and utilization arithmetic.

pub mod input;
pub mod service;
pub mod types;

pub use input::{BudgetForm, BudgetInput, FISCAL_YEAR_RANGE};
pub use service::BudgetService;
pub use types::BudgetType;
