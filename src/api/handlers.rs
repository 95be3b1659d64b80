use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::api::requests::{CreateAccountRequest, CreateTransactionRequest, HistoryQuery};
use crate::api::responses::{AccountResponse, HealthResponse, LedgerEntryResponse, TransactionResponse};
use crate::error::AppError;
use crate::models::{Account, Currency, TransactionType};
use crate::observability::get_metrics;
use crate::processor::{self, TransactionRequest};
use crate::store::Store;

use super::routes::AppState;

const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, uptime) = match &state.health_checker {
        Some(checker) => {
            let health = checker.check_all().await;
            (health.status.is_healthy(), checker.uptime_seconds())
        }
        None => (true, 0),
    };

    Json(HealthResponse {
        status: if status { "healthy".to_string() } else { "degraded".to_string() },
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds: uptime,
    })
}

pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match &state.health_checker {
        Some(checker) if checker.is_ready().await => StatusCode::OK,
        Some(_) => StatusCode::SERVICE_UNAVAILABLE,
        None => StatusCode::OK,
    }
}

pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    match &state.metrics_handle {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let currency = Currency::parse(&request.currency)?;

    let account = Account::new(request.name, currency);
    let created = state.store.create_account(account).await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(created))))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.store.get_account(id).await?;
    Ok(Json(AccountResponse::from(account)))
}

pub async fn get_account_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<LedgerEntryResponse>>, AppError> {
    let (limit, offset) = query.clamped();
    let entries = state.store.get_account_history(id, limit, offset).await?;
    Ok(Json(entries.into_iter().map(LedgerEntryResponse::from).collect()))
}

fn parse_idempotency_key(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get("Idempotency-Key") else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::BadRequest("Idempotency-Key header is not valid UTF-8".into()))?
        .trim();
    if value.is_empty() || value.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::BadRequest(format!(
            "Idempotency-Key must be 1-{MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    Ok(Some(value.to_string()))
}

fn parse_transaction_type(raw: &str) -> Result<TransactionType, AppError> {
    match raw.to_uppercase().as_str() {
        "DEPOSIT" => Ok(TransactionType::Deposit),
        "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
        "TRANSFER" => Ok(TransactionType::Transfer),
        other => Err(AppError::BadRequest(format!("unknown transaction type '{other}'"))),
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let idempotency_key = parse_idempotency_key(&headers)?;
    let transaction_type = parse_transaction_type(&request.transaction_type)?;

    let metrics = get_metrics();
    metrics.record_transaction_created(&request.transaction_type);

    let tx_request = TransactionRequest::new(
        request.account_id,
        transaction_type,
        request.amount,
        request.reference,
        request.receiver_id,
    )?;

    match processor::process_transaction(&state.store, tx_request, idempotency_key).await {
        Ok(tx) => {
            metrics.record_transaction_completed(&request.transaction_type);
            Ok((StatusCode::CREATED, Json(TransactionResponse::from(tx))))
        }
        Err(e) => {
            metrics.record_transaction_failed(&request.transaction_type, e.to_string().as_str());
            Err(e)
        }
    }
}
