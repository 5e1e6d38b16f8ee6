//! Dashboard data types.

use chrono::NaiveDate;
use medfin_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lifecycle::RecordStatus;
use crate::transaction::TransactionType;

/// Transaction activity as fed to the engine.
///
/// A row may stand for one transaction or for the sum of several sharing
/// account, type, status and date; every figure is additive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerActivity {
    /// Account posted to.
    pub account_id: AccountId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Lifecycle status.
    pub status: RecordStatus,
    /// Amount.
    pub amount: Decimal,
    /// Transaction date.
    pub transaction_date: NaiveDate,
}

/// Budget allocation as fed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetAllocation {
    /// Account budgeted.
    pub account_id: AccountId,
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Lifecycle status.
    pub status: RecordStatus,
    /// Amount.
    pub amount: Decimal,
}

/// A level-1 account shown in the budget comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelAccount {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
}

/// Headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Approved income minus approved expense, all time.
    pub total_cash_balance: Decimal,
    /// Approved income in the selected month.
    pub monthly_income: Decimal,
    /// Approved expense in the selected month.
    pub monthly_expense: Decimal,
    /// Approved budgets for the fiscal year.
    pub total_budget: Decimal,
    /// Approved transactions of every type in the year.
    pub budget_realization: Decimal,
    /// Realization as a percentage of the total budget.
    pub budget_utilization: Decimal,
}

/// One month of the trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    /// Month number, 1..=12.
    pub month: u32,
    /// Approved income.
    pub income: Decimal,
    /// Approved expense.
    pub expense: Decimal,
}

/// Budget against realization for one level-1 account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetComparisonRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Approved budgets posted directly to the account.
    pub budget: Decimal,
    /// Approved transactions posted directly to the account.
    pub realization: Decimal,
}

/// Recent transaction with display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTransaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Reference number.
    pub reference_number: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Amount.
    pub amount: Decimal,
    /// Status.
    pub status: RecordStatus,
    /// Description.
    pub description: String,
    /// Account code.
    pub account_code: Option<String>,
    /// Account name.
    pub account_name: Option<String>,
    /// Unit name.
    pub unit_name: Option<String>,
    /// Creator name.
    pub created_by: Option<String>,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    /// Selected year.
    pub year: i32,
    /// Selected month.
    pub month: u32,
    /// Headline figures.
    pub summary: FinancialSummary,
    /// Twelve monthly points.
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    /// Per level-1 account comparison.
    pub budget_comparison: Vec<BudgetComparisonRow>,
    /// Newest transactions.
    pub recent_transactions: Vec<RecentTransaction>,
}
