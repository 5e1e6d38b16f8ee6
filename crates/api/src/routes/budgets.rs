//! Budget routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use medfin_core::budget::BudgetForm;
use medfin_core::lifecycle::RecordStatus;
use medfin_db::entities::budgets;
use medfin_db::{BudgetFilter, BudgetRepository, BudgetRow};
use medfin_shared::FieldErrors;
use medfin_shared::types::{BudgetId, PageRequest, PageResponse};
use serde::Deserialize;
use tracing::info;

use crate::{ActingUser, AppState, error::ApiResult};

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route(
            "/budgets/{budget_id}",
            get(get_budget).patch(update_budget).delete(delete_budget),
        )
        .route("/budgets/{budget_id}/approve", post(approve_budget))
        .route("/budgets/{budget_id}/lock", post(lock_budget))
}

/// Query parameters for listing budgets.
#[derive(Debug, Default, Deserialize)]
pub struct ListBudgetsQuery {
    /// Filter by fiscal year.
    pub fiscal_year: Option<i32>,
    /// One of draft, approved, locked.
    pub status: Option<String>,
    /// Filter by account.
    pub account_id: Option<i64>,
    /// Filter by unit.
    pub unit_id: Option<i64>,
    /// 1-indexed page.
    pub page: Option<u32>,
}

impl ListBudgetsQuery {
    fn filter(&self) -> Result<BudgetFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = RecordStatus::parse(raw);
                if parsed.is_none() {
                    errors.add("status", "Status must be draft, approved, or locked.");
                }
                parsed
            }
        };
        errors.into_result(BudgetFilter {
            fiscal_year: self.fiscal_year,
            status,
            account_id: self.account_id,
            unit_id: self.unit_id,
        })
    }
}

/// GET `/budgets` - Paginated budgets, newest first.
async fn list_budgets(
    State(state): State<AppState>,
    Query(query): Query<ListBudgetsQuery>,
) -> ApiResult<Json<PageResponse<BudgetRow>>> {
    let filter = query.filter()?;
    let page = PageRequest::fixed(query.page, state.config.ledger.page_size);
    let budgets = BudgetRepository::new(state.conn()).list(&filter, &page).await?;
    Ok(Json(budgets))
}

/// POST `/budgets` - Create a draft budget.
async fn create_budget(
    State(state): State<AppState>,
    user: ActingUser,
    Json(form): Json<BudgetForm>,
) -> ApiResult<(StatusCode, Json<budgets::Model>)> {
    let input = form.validate()?;
    let budget = BudgetRepository::new(state.conn())
        .create(&input, user.id())
        .await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

async fn get_budget(
    State(state): State<AppState>,
    Path(budget_id): Path<i64>,
) -> ApiResult<Json<budgets::Model>> {
    let budget = BudgetRepository::new(state.conn())
        .find(BudgetId::new(budget_id))
        .await?;
    Ok(Json(budget))
}

async fn update_budget(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(budget_id): Path<i64>,
    Json(form): Json<BudgetForm>,
) -> ApiResult<Json<budgets::Model>> {
    let input = form.validate()?;
    let budget = BudgetRepository::new(state.conn())
        .update(BudgetId::new(budget_id), &input)
        .await?;
    Ok(Json(budget))
}

async fn delete_budget(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(budget_id): Path<i64>,
) -> ApiResult<StatusCode> {
    BudgetRepository::new(state.conn())
        .delete(BudgetId::new(budget_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/budgets/{id}/approve` - Approve a draft budget.
async fn approve_budget(
    State(state): State<AppState>,
    user: ActingUser,
    Path(budget_id): Path<i64>,
) -> ApiResult<Json<budgets::Model>> {
    let budget = BudgetRepository::new(state.conn())
        .approve(BudgetId::new(budget_id), user.id())
        .await?;
    info!(budget_id, approver = %user.id(), "Budget approved via API");
    Ok(Json(budget))
}

/// POST `/budgets/{id}/lock` - Lock a budget against further changes.
async fn lock_budget(
    State(state): State<AppState>,
    user: ActingUser,
    Path(budget_id): Path<i64>,
) -> ApiResult<Json<budgets::Model>> {
    let budget = BudgetRepository::new(state.conn())
        .lock(BudgetId::new(budget_id))
        .await?;
    info!(budget_id, user_id = %user.id(), "Budget locked via API");
    Ok(Json(budget))
}
