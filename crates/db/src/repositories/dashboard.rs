//! Dashboard repository.
//!
//! Loads approved activity pre-summed per account, type and date, plus
//! approved budget totals, and hands them to the pure [`DashboardEngine`].

use chrono::NaiveDate;
use medfin_core::dashboard::{
    BudgetAllocation, DashboardEngine, DashboardView, LedgerActivity, RecentTransaction,
    TopLevelAccount,
};
use medfin_core::lifecycle::RecordStatus as DomainStatus;
use medfin_core::transaction::TransactionType as DomainType;
use medfin_shared::AppError;
use medfin_shared::types::{AccountId, TransactionId, round_money};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, warn};

use super::transaction::attach_names;
use crate::entities::sea_orm_active_enums::RecordStatus;
use crate::entities::{budgets, ledger_accounts, transactions};

/// Error types for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Month outside 1..=12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::InvalidMonth(month) => Self::Validation(format!(
                "Month must be between 1 and 12, got {month}"
            )),
            DashboardError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the dashboard for `year` and `month`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMonth` or a database error.
    pub async fn view(
        &self,
        year: i32,
        month: u32,
        recent_limit: u64,
    ) -> Result<DashboardView, DashboardError> {
        if !(1..=12).contains(&month) {
            return Err(DashboardError::InvalidMonth(month));
        }

        let activity = self.approved_activity().await?;
        let allocations = self.approved_allocations(year).await?;
        let accounts = self.top_level_accounts().await?;
        debug!(
            year,
            month,
            activity_rows = activity.len(),
            allocation_rows = allocations.len(),
            "Computing dashboard"
        );

        let engine = DashboardEngine::new(&activity, &allocations);
        let recent_transactions = self.recent(recent_limit).await?;

        Ok(DashboardView {
            year,
            month,
            summary: engine.summary(year, month),
            monthly_trend: engine.monthly_trend(year),
            budget_comparison: engine.budget_comparison(year, &accounts),
            recent_transactions,
        })
    }

    /// Approved transaction amounts summed per account, type and date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn approved_activity(&self) -> Result<Vec<LedgerActivity>, DbErr> {
        let rows: Vec<(i64, String, NaiveDate, Option<Decimal>)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::AccountId)
            .column(transactions::Column::TransactionType)
            .column(transactions::Column::TransactionDate)
            .column_as(transactions::Column::Amount.sum(), "amount")
            .filter(transactions::Column::Status.eq(RecordStatus::Approved))
            .group_by(transactions::Column::AccountId)
            .group_by(transactions::Column::TransactionType)
            .group_by(transactions::Column::TransactionDate)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(account_id, ty, transaction_date, amount)| {
                let Some(transaction_type) = DomainType::parse(&ty) else {
                    warn!(account_id, transaction_type = %ty, "Skipping unknown transaction type");
                    return None;
                };
                Some(LedgerActivity {
                    account_id: AccountId::new(account_id),
                    transaction_type,
                    status: DomainStatus::Approved,
                    amount: round_money(amount.unwrap_or_default()),
                    transaction_date,
                })
            })
            .collect())
    }

    /// Approved budget amounts for `year`, summed per account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn approved_allocations(&self, year: i32) -> Result<Vec<BudgetAllocation>, DbErr> {
        let rows: Vec<(i64, Option<Decimal>)> = budgets::Entity::find()
            .select_only()
            .column(budgets::Column::AccountId)
            .column_as(budgets::Column::Amount.sum(), "amount")
            .filter(budgets::Column::Status.eq(RecordStatus::Approved))
            .filter(budgets::Column::FiscalYear.eq(year))
            .group_by(budgets::Column::AccountId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(account_id, amount)| BudgetAllocation {
                account_id: AccountId::new(account_id),
                fiscal_year: year,
                status: DomainStatus::Approved,
                amount: round_money(amount.unwrap_or_default()),
            })
            .collect())
    }

    async fn top_level_accounts(&self) -> Result<Vec<TopLevelAccount>, DbErr> {
        Ok(ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::Level.eq(1))
            .order_by_asc(ledger_accounts::Column::Code)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| TopLevelAccount {
                id: AccountId::new(a.id),
                code: a.code,
                name: a.name,
            })
            .collect())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<RecentTransaction>, DbErr> {
        let models = transactions::Entity::find()
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(attach_names(&self.db, models)
            .await?
            .into_iter()
            .map(|row| RecentTransaction {
                id: TransactionId::new(row.transaction.id),
                reference_number: row.transaction.reference_number,
                transaction_date: row.transaction.transaction_date,
                transaction_type: row.transaction.transaction_type.into(),
                amount: row.transaction.amount,
                status: row.transaction.status.into(),
                description: row.transaction.description,
                account_code: row.account_code,
                account_name: row.account_name,
                unit_name: row.unit_name,
                created_by: row.created_by_name,
            })
            .collect())
    }
}
