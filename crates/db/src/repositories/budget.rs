//! Budget repository.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use medfin_core::budget::BudgetInput;
use medfin_core::lifecycle::{
    LifecycleAction, LifecycleError, LifecycleGuard, LifecycleService, Mutation, RecordKind,
    RecordStatus as DomainStatus,
};
use medfin_shared::types::{BudgetId, PageRequest, PageResponse, UserId};
use medfin_shared::{AppError, FieldErrors};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::check_references;
use crate::entities::sea_orm_active_enums::{BudgetType, RecordStatus};
use crate::entities::{budgets, ledger_accounts, organizational_units};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(BudgetId),

    /// Referenced account or unit does not exist.
    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    /// Refused by the lifecycle rules.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::NotFound(id) => Self::NotFound(format!("Budget {id} not found")),
            BudgetError::Invalid(fields) => Self::InvalidFields(fields),
            BudgetError::Lifecycle(e) => Self::BusinessRule(e.to_string()),
            BudgetError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter options for listing budgets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetFilter {
    /// Filter by fiscal year.
    pub fiscal_year: Option<i32>,
    /// Filter by status.
    pub status: Option<DomainStatus>,
    /// Filter by account.
    pub account_id: Option<i64>,
    /// Filter by unit.
    pub unit_id: Option<i64>,
}

/// A budget with the display names of what it references.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetRow {
    /// The stored record.
    #[serde(flatten)]
    pub budget: budgets::Model,
    /// Account code.
    pub account_code: Option<String>,
    /// Account name.
    pub account_name: Option<String>,
    /// Unit name.
    pub unit_name: Option<String>,
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft budget.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the account or unit does not exist.
    pub async fn create(
        &self,
        input: &BudgetInput,
        created_by: UserId,
    ) -> Result<budgets::Model, BudgetError> {
        let errors = check_references(&self.db, input.account_id, input.unit_id).await?;
        if !errors.is_empty() {
            return Err(BudgetError::Invalid(errors));
        }

        let now = Utc::now();
        let budget = budgets::ActiveModel {
            fiscal_year: Set(input.fiscal_year),
            account_id: Set(input.account_id.into_inner()),
            unit_id: Set(input.unit_id.into_inner()),
            budget_type: Set(input.budget_type.into()),
            amount: Set(input.amount),
            description: Set(input.description.clone()),
            status: Set(RecordStatus::Draft),
            created_by: Set(created_by.into_inner()),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = budget.insert(&self.db).await?;

        info!(
            budget_id = model.id,
            fiscal_year = model.fiscal_year,
            amount = %model.amount,
            "Budget created"
        );
        Ok(model)
    }

    /// Lists budgets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &BudgetFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<BudgetRow>, BudgetError> {
        let mut query = budgets::Entity::find();
        if let Some(year) = filter.fiscal_year {
            query = query.filter(budgets::Column::FiscalYear.eq(year));
        }
        if let Some(status) = filter.status {
            query = query.filter(budgets::Column::Status.eq(RecordStatus::from(status)));
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(budgets::Column::AccountId.eq(account_id));
        }
        if let Some(unit_id) = filter.unit_id {
            query = query.filter(budgets::Column::UnitId.eq(unit_id));
        }

        let paginator = query
            .order_by_desc(budgets::Column::CreatedAt)
            .order_by_desc(budgets::Column::Id)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let models = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;
        let rows = self.attach_names(models).await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    async fn attach_names(&self, models: Vec<budgets::Model>) -> Result<Vec<BudgetRow>, DbErr> {
        let account_ids: HashSet<i64> = models.iter().map(|m| m.account_id).collect();
        let unit_ids: HashSet<i64> = models.iter().map(|m| m.unit_id).collect();
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let accounts: HashMap<i64, ledger_accounts::Model> = ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::Id.is_in(account_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let units: HashMap<i64, String> = organizational_units::Entity::find()
            .filter(organizational_units::Column::Id.is_in(unit_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(models
            .into_iter()
            .map(|budget| {
                let account = accounts.get(&budget.account_id);
                BudgetRow {
                    account_code: account.map(|a| a.code.clone()),
                    account_name: account.map(|a| a.name.clone()),
                    unit_name: units.get(&budget.unit_id).cloned(),
                    budget,
                }
            })
            .collect())
    }

    /// Finds a budget by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist.
    pub async fn find(&self, id: BudgetId) -> Result<budgets::Model, BudgetError> {
        budgets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(BudgetError::NotFound(id))
    }

    /// Replaces the editable fields of an unlocked budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Invalid`, or `Lifecycle` if the budget is locked.
    pub async fn update(
        &self,
        id: BudgetId,
        input: &BudgetInput,
    ) -> Result<budgets::Model, BudgetError> {
        let existing = self.find(id).await?;
        LifecycleGuard::ensure_modifiable(existing.status.into(), RecordKind::Budget, Mutation::Update)?;

        let errors = check_references(&self.db, input.account_id, input.unit_id).await?;
        if !errors.is_empty() {
            return Err(BudgetError::Invalid(errors));
        }

        let result = budgets::Entity::update_many()
            .col_expr(budgets::Column::FiscalYear, Expr::value(input.fiscal_year))
            .col_expr(budgets::Column::AccountId, Expr::value(input.account_id.into_inner()))
            .col_expr(budgets::Column::UnitId, Expr::value(input.unit_id.into_inner()))
            .col_expr(
                budgets::Column::BudgetType,
                Expr::value(BudgetType::from(input.budget_type)),
            )
            .col_expr(budgets::Column::Amount, Expr::value(input.amount))
            .col_expr(budgets::Column::Description, Expr::value(input.description.clone()))
            .col_expr(budgets::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(budgets::Column::Id.eq(id.into_inner()))
            .filter(budgets::Column::Status.ne(RecordStatus::Locked))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(self.refusal(id, Mutation::Update).await);
        }

        info!(budget_id = %id, "Budget updated");
        self.find(id).await
    }

    /// Deletes an unlocked budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` if the budget is locked.
    pub async fn delete(&self, id: BudgetId) -> Result<(), BudgetError> {
        let existing = self.find(id).await?;
        LifecycleGuard::ensure_modifiable(existing.status.into(), RecordKind::Budget, Mutation::Delete)?;

        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(id.into_inner()))
            .filter(budgets::Column::Status.ne(RecordStatus::Locked))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(self.refusal(id, Mutation::Delete).await);
        }

        info!(budget_id = %id, "Budget deleted");
        Ok(())
    }

    /// Approves a draft budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` unless the budget is a draft.
    pub async fn approve(
        &self,
        id: BudgetId,
        approver: UserId,
    ) -> Result<budgets::Model, BudgetError> {
        let existing = self.find(id).await?;
        let action = LifecycleService::approve(existing.status.into(), approver)?;
        self.transition(id, &action, &[DomainStatus::Draft]).await
    }

    /// Locks a draft or approved budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` if it is already locked.
    pub async fn lock(&self, id: BudgetId) -> Result<budgets::Model, BudgetError> {
        let existing = self.find(id).await?;
        let action = LifecycleService::lock(existing.status.into())?;
        self.transition(id, &action, &[DomainStatus::Draft, DomainStatus::Approved])
            .await
    }

    async fn transition(
        &self,
        id: BudgetId,
        action: &LifecycleAction,
        from: &[DomainStatus],
    ) -> Result<budgets::Model, BudgetError> {
        let to = action.new_status();
        let mut update = budgets::Entity::update_many()
            .col_expr(budgets::Column::Status, Expr::value(RecordStatus::from(to)))
            .col_expr(budgets::Column::UpdatedAt, Expr::value(Utc::now()));
        if let LifecycleAction::Approve {
            approved_by,
            approved_at,
            ..
        } = action
        {
            update = update
                .col_expr(budgets::Column::ApprovedBy, Expr::value(approved_by.into_inner()))
                .col_expr(budgets::Column::ApprovedAt, Expr::value(*approved_at));
        }

        let result = update
            .filter(budgets::Column::Id.eq(id.into_inner()))
            .filter(budgets::Column::Status.is_in(from.iter().map(|s| RecordStatus::from(*s))))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            let current = self.find(id).await?;
            return Err(LifecycleError::InvalidTransition {
                from: current.status.into(),
                to,
            }
            .into());
        }

        info!(budget_id = %id, status = %to, "Budget status changed");
        self.find(id).await
    }

    async fn refusal(&self, id: BudgetId, mutation: Mutation) -> BudgetError {
        match budgets::Entity::find_by_id(id.into_inner()).one(&self.db).await {
            Ok(Some(_)) => {
                warn!(budget_id = %id, %mutation, "Refused mutation of locked budget");
                LifecycleError::Locked {
                    kind: RecordKind::Budget,
                    mutation,
                }
                .into()
            }
            Ok(None) => BudgetError::NotFound(id),
            Err(e) => e.into(),
        }
    }
}
