//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use medfin_core::account::AccountForm;
use medfin_db::entities::ledger_accounts;
use medfin_db::{AccountFilter, AccountRepository};
use medfin_shared::types::AccountId;
use serde_json::{Value, json};
use tracing::info;

use crate::{ActingUser, AppState, error::ApiResult};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{account_id}",
            get(get_account).patch(update_account).delete(delete_account),
        )
}

/// GET `/accounts` - List accounts ordered by code.
async fn list_accounts(
    State(state): State<AppState>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<Json<Vec<ledger_accounts::Model>>> {
    let accounts = AccountRepository::new(state.conn()).list(&filter).await?;
    Ok(Json(accounts))
}

/// POST `/accounts` - Create an account; its level follows the parent.
async fn create_account(
    State(state): State<AppState>,
    user: ActingUser,
    Json(form): Json<AccountForm>,
) -> ApiResult<(StatusCode, Json<ledger_accounts::Model>)> {
    let input = form.validate()?;
    let account = AccountRepository::new(state.conn()).create(input).await?;
    info!(account_id = account.id, user_id = %user.id(), "Account created via API");
    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> ApiResult<Json<ledger_accounts::Model>> {
    let account = AccountRepository::new(state.conn())
        .find(AccountId::new(account_id))
        .await?;
    Ok(Json(account))
}

async fn update_account(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(account_id): Path<i64>,
    Json(form): Json<AccountForm>,
) -> ApiResult<Json<ledger_accounts::Model>> {
    let input = form.validate()?;
    let account = AccountRepository::new(state.conn())
        .update(AccountId::new(account_id), input)
        .await?;
    Ok(Json(account))
}

/// DELETE `/accounts/{id}` - Delete an account and its descendants.
async fn delete_account(
    State(state): State<AppState>,
    user: ActingUser,
    Path(account_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let removed = AccountRepository::new(state.conn())
        .delete(AccountId::new(account_id))
        .await?;
    info!(account_id, removed, user_id = %user.id(), "Account deleted via API");
    Ok(Json(json!({ "deleted": removed })))
}
