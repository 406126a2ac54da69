use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::error::{CheckoutError, StorefrontError};

/// Errors a handler can return, mapped to a status code and `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Storefront(e) => match e {
                StorefrontError::NotFound(_) => StatusCode::NOT_FOUND,
                StorefrontError::AlreadyExists(_)
                | StorefrontError::InUse { .. }
                | StorefrontError::InsufficientStock { .. } => StatusCode::CONFLICT,
                StorefrontError::Invalid(_) | StorefrontError::AmountOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
                StorefrontError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(e) => match e {
                CheckoutError::EmptyCart | CheckoutError::AmountOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::ProductNotFound(_) | CheckoutError::UnknownClient(_) => StatusCode::NOT_FOUND,
                CheckoutError::InsufficientStock { .. } => StatusCode::CONFLICT,
                CheckoutError::TransactionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
