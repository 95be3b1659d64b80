use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Closed error taxonomy for the ledger core, plus an open `Internal` bucket for
/// everything this crate does not specifically reason about.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("currency mismatch: {0}")]
    CurrencyMismatch(String),

    #[error("amount out of range: {0}")]
    Overflow(String),

    #[error("duplicate idempotency key: {0}")]
    DuplicateIdempotencyKey(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("serialization conflict: {0}")]
    Serialization(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            AppError::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            AppError::InvalidAmount(_) => "INVALID_AMOUNT",
            AppError::CurrencyMismatch(_) => "CURRENCY_MISMATCH",
            AppError::Overflow(_) => "INVALID_AMOUNT",
            AppError::DuplicateIdempotencyKey(_) => "INTERNAL_ERROR",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::Serialization(_) => "STORE_UNAVAILABLE",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientFunds(_)
            | AppError::InvalidAmount(_)
            | AppError::CurrencyMismatch(_)
            | AppError::Overflow(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // DuplicateIdempotencyKey is handled internally by the processor and should
            // never reach this mapping in normal operation; 500 if it somehow escapes.
            AppError::DuplicateIdempotencyKey(_)
            | AppError::StoreUnavailable(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
