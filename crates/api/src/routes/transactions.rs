//! Transaction routes.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use medfin_core::transaction::{TransactionFilter, TransactionForm, TransactionQuery};
use medfin_db::entities::transactions;
use medfin_db::{TransactionRepository, TransactionRow};
use medfin_shared::AppError;
use medfin_shared::types::{PageRequest, PageResponse, TransactionId};
use tracing::{info, warn};

use crate::{ActingUser, AppState, error::ApiError, error::ApiResult};

/// Multipart field carrying the proof document.
pub const PROOF_FIELD: &str = "proof_file";

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the transaction routes.
pub fn routes(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/{transaction_id}",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{transaction_id}/edit", get(edit_transaction))
        .route("/transactions/{transaction_id}/approve", post(approve_transaction))
        .route("/transactions/{transaction_id}/lock", post(lock_transaction))
        .route(
            "/transactions/{transaction_id}/proof",
            post(upload_proof).layer(DefaultBodyLimit::max(
                max_file_size.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
}

fn repository(state: &AppState) -> TransactionRepository {
    TransactionRepository::new(state.conn())
        .with_retry_limit(state.config.ledger.reference_retry_limit)
}

/// GET `/transactions` - Paginated, filtered listing, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult<Json<PageResponse<TransactionRow>>> {
    let filter = TransactionFilter::from_query(&query)?;
    let page = PageRequest::fixed(query.page, state.config.ledger.page_size);
    let rows = repository(&state).list(&filter, &page).await?;
    Ok(Json(rows))
}

/// POST `/transactions` - Create a draft transaction with a fresh reference number.
async fn create_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Json(form): Json<TransactionForm>,
) -> ApiResult<(StatusCode, Json<transactions::Model>)> {
    let input = form.validate()?;
    let today = Utc::now().date_naive();
    let transaction = repository(&state).create(&input, user.id(), today).await?;
    info!(
        transaction_id = transaction.id,
        reference = %transaction.reference_number,
        user_id = %user.id(),
        "Transaction created via API"
    );
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> ApiResult<Json<TransactionRow>> {
    let row = repository(&state)
        .find_row(TransactionId::new(transaction_id))
        .await?;
    Ok(Json(row))
}

/// GET `/transactions/{id}/edit` - Load for editing; refused once locked.
async fn edit_transaction(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(transaction_id): Path<i64>,
) -> ApiResult<Json<transactions::Model>> {
    let transaction = repository(&state)
        .find_for_edit(TransactionId::new(transaction_id))
        .await?;
    Ok(Json(transaction))
}

async fn update_transaction(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(transaction_id): Path<i64>,
    Json(form): Json<TransactionForm>,
) -> ApiResult<Json<transactions::Model>> {
    let input = form.validate()?;
    let transaction = repository(&state)
        .update(TransactionId::new(transaction_id), &input)
        .await?;
    Ok(Json(transaction))
}

async fn delete_transaction(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(transaction_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let removed = repository(&state)
        .delete(TransactionId::new(transaction_id))
        .await?;

    if let (Some(store), Some(key)) = (&state.storage, removed.proof_file.as_deref()) {
        if let Err(e) = store.delete(key).await {
            warn!(error = %e, key, "Failed to remove proof document of deleted transaction");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/transactions/{id}/approve` - Approve a draft transaction.
async fn approve_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Path(transaction_id): Path<i64>,
) -> ApiResult<Json<transactions::Model>> {
    let transaction = repository(&state)
        .approve(TransactionId::new(transaction_id), user.id())
        .await?;
    info!(transaction_id, approver = %user.id(), "Transaction approved via API");
    Ok(Json(transaction))
}

/// POST `/transactions/{id}/lock` - Lock a transaction against further changes.
async fn lock_transaction(
    State(state): State<AppState>,
    user: ActingUser,
    Path(transaction_id): Path<i64>,
) -> ApiResult<Json<transactions::Model>> {
    let transaction = repository(&state)
        .lock(TransactionId::new(transaction_id))
        .await?;
    info!(transaction_id, user_id = %user.id(), "Transaction locked via API");
    Ok(Json(transaction))
}

/// POST `/transactions/{id}/proof` - Attach a PDF, JPEG or PNG proof document.
async fn upload_proof(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(transaction_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<transactions::Model>> {
    let Some(store) = state.storage.clone() else {
        return Err(ApiError(AppError::Storage(
            "Proof storage is not configured".to_string(),
        )));
    };
    let id = TransactionId::new(transaction_id);
    let repo = repository(&state);
    let existing = repo.find_for_edit(id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(AppError::Validation(e.body_text())))?
    {
        if field.name() != Some(PROOF_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError(AppError::Validation(e.body_text())))?;
        upload = Some((filename, bytes));
        break;
    }
    let Some((filename, bytes)) = upload else {
        return Err(AppError::field(PROOF_FIELD, "Proof file is required.").into());
    };

    let key = store.store(id, &filename, bytes.to_vec()).await?;
    let updated = match repo.set_proof_file(id, &key).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Err(cleanup) = store.delete(&key).await {
                warn!(error = %cleanup, key, "Failed to remove orphaned proof document");
            }
            return Err(e.into());
        }
    };

    if let Some(previous) = existing.proof_file.as_deref() {
        if let Err(e) = store.delete(previous).await {
            warn!(error = %e, key = previous, "Failed to remove replaced proof document");
        }
    }
    info!(transaction_id, key, "Proof document uploaded");
    Ok(Json(updated))
}
