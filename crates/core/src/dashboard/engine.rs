//! Pure dashboard aggregation over in-memory rows.
//!
//! Year and month are always explicit; the caller decides what "now" is.
//! Only approved records count, whatever the input contains.

use chrono::Datelike;
use rust_decimal::Decimal;

use super::types::{
    BudgetAllocation, BudgetComparisonRow, FinancialSummary, LedgerActivity, MonthlyTrendPoint,
    TopLevelAccount,
};
use crate::budget::BudgetService;
use crate::transaction::TransactionType;

/// Aggregates activity and budgets into dashboard figures.
#[derive(Debug, Clone, Copy)]
pub struct DashboardEngine<'a> {
    activity: &'a [LedgerActivity],
    budgets: &'a [BudgetAllocation],
}

impl<'a> DashboardEngine<'a> {
    /// Engine over the given rows.
    #[must_use]
    pub fn new(activity: &'a [LedgerActivity], budgets: &'a [BudgetAllocation]) -> Self {
        Self { activity, budgets }
    }

    fn approved(&self) -> impl Iterator<Item = &'a LedgerActivity> {
        self.activity.iter().filter(|a| a.status.is_approved())
    }

    fn approved_budgets(&self, year: i32) -> impl Iterator<Item = &'a BudgetAllocation> {
        self.budgets
            .iter()
            .filter(move |b| b.status.is_approved() && b.fiscal_year == year)
    }

    fn sum_where(&self, pred: impl Fn(&LedgerActivity) -> bool) -> Decimal {
        self.approved().filter(|a| pred(a)).map(|a| a.amount).sum()
    }

    /// Approved income minus approved expense across all time.
    #[must_use]
    pub fn total_cash_balance(&self) -> Decimal {
        self.sum_where(|a| a.transaction_type == TransactionType::Income)
            - self.sum_where(|a| a.transaction_type == TransactionType::Expense)
    }

    /// Approved income dated in `year`/`month`.
    #[must_use]
    pub fn monthly_income(&self, year: i32, month: u32) -> Decimal {
        self.sum_where(|a| {
            a.transaction_type == TransactionType::Income && in_month(a, year, month)
        })
    }

    /// Approved expense dated in `year`/`month`.
    #[must_use]
    pub fn monthly_expense(&self, year: i32, month: u32) -> Decimal {
        self.sum_where(|a| {
            a.transaction_type == TransactionType::Expense && in_month(a, year, month)
        })
    }

    /// Approved budgets for fiscal `year`.
    #[must_use]
    pub fn total_budget(&self, year: i32) -> Decimal {
        self.approved_budgets(year).map(|b| b.amount).sum()
    }

    /// Approved transactions of every type dated in `year`.
    #[must_use]
    pub fn budget_realization(&self, year: i32) -> Decimal {
        self.sum_where(|a| a.transaction_date.year() == year)
    }

    /// Realization over total budget, percent, two decimals; zero without a budget.
    #[must_use]
    pub fn budget_utilization(&self, year: i32) -> Decimal {
        BudgetService::utilization_percent(self.budget_realization(year), self.total_budget(year))
    }

    /// Income and expense for each month 1..=12 of `year`, zero-filled.
    #[must_use]
    pub fn monthly_trend(&self, year: i32) -> Vec<MonthlyTrendPoint> {
        let mut points: Vec<MonthlyTrendPoint> = (1..=12)
            .map(|month| MonthlyTrendPoint {
                month,
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
            })
            .collect();

        for a in self.approved().filter(|a| a.transaction_date.year() == year) {
            let point = &mut points[a.transaction_date.month0() as usize];
            match a.transaction_type {
                TransactionType::Income => point.income += a.amount,
                TransactionType::Expense => point.expense += a.amount,
                TransactionType::Return | TransactionType::Correction => {}
            }
        }
        points
    }

    /// Budget and realization posted directly to each level-1 account.
    ///
    /// Descendant accounts are not rolled up.
    #[must_use]
    pub fn budget_comparison(
        &self,
        year: i32,
        accounts: &[TopLevelAccount],
    ) -> Vec<BudgetComparisonRow> {
        accounts
            .iter()
            .map(|account| BudgetComparisonRow {
                account_id: account.id,
                code: account.code.clone(),
                name: account.name.clone(),
                budget: self
                    .approved_budgets(year)
                    .filter(|b| b.account_id == account.id)
                    .map(|b| b.amount)
                    .sum(),
                realization: self.sum_where(|a| {
                    a.account_id == account.id && a.transaction_date.year() == year
                }),
            })
            .collect()
    }

    /// The six headline figures.
    #[must_use]
    pub fn summary(&self, year: i32, month: u32) -> FinancialSummary {
        FinancialSummary {
            total_cash_balance: self.total_cash_balance(),
            monthly_income: self.monthly_income(year, month),
            monthly_expense: self.monthly_expense(year, month),
            total_budget: self.total_budget(year),
            budget_realization: self.budget_realization(year),
            budget_utilization: self.budget_utilization(year),
        }
    }
}

fn in_month(a: &LedgerActivity, year: i32, month: u32) -> bool {
    a.transaction_date.year() == year && a.transaction_date.month() == month
}
