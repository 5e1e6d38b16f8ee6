//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medfin_core::storage::StorageError;
use medfin_db::{
    AccountError, BudgetError, DashboardError, TransactionError, UnitError, UserError,
};
use medfin_shared::{AppError, FieldErrors};
use serde::Serialize;
use tracing::error;

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

/// Wraps [`AppError`] so it can be returned from handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal details stay in the log.
        let message = match &self.0 {
            AppError::Database(detail) | AppError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "An internal error occurred".to_string()
            }
            AppError::Storage(detail) => {
                error!(error = %detail, "Storage request failed");
                "The storage backend is unavailable".to_string()
            }
            AppError::InvalidFields(_) => "The given data was invalid.".to_string(),
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BusinessRule(msg)
            | AppError::Conflict(msg) => msg.clone(),
        };
        let fields = match &self.0 {
            AppError::InvalidFields(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorBody {
            error: self.0.error_code(),
            message,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self(AppError::InvalidFields(errors))
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        if err.is_rejection() {
            Self(AppError::field("proof_file", &err.to_string()))
        } else {
            Self(AppError::Storage(err.to_string()))
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

macro_rules! via_app_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    Self(AppError::from(err))
                }
            }
        )*
    };
}

via_app_error!(
    AccountError,
    UnitError,
    BudgetError,
    TransactionError,
    DashboardError,
    UserError,
);

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_field_errors_render_fields() {
        let response = ApiError(AppError::field("amount", "Amount is required.")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "INVALID_FIELDS");
        assert_eq!(body["fields"]["amount"][0], "Amount is required.");
    }

    #[tokio::test]
    async fn test_database_detail_is_hidden() {
        let response = ApiError(AppError::Database("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("fields").is_none());
    }

    #[tokio::test]
    async fn test_storage_rejection_is_a_field_error() {
        let response = ApiError::from(StorageError::InvalidFileType).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(
            body["fields"]["proof_file"][0],
            "Proof file must be a PDF or image file."
        );

        let response = ApiError::from(StorageError::configuration("no bucket")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
