mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use ledger_engine::api::{create_router, AppState};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[ignore]
async fn create_account_and_deposit_then_withdraw() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let app = create_router(AppState::new(pool.clone()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts")
                .header("content-type", "application/json")
                .body(Body::from(json!({"name": "alice", "currency": "USD"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let account = body_json(response).await;
    let account_id = account["id"].as_str().unwrap().to_string();
    assert_eq!(account["balance"], "0.00");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transactions")
                .header("content-type", "application/json")
                .header("Idempotency-Key", "dep-1")
                .body(Body::from(
                    json!({
                        "account_id": account_id,
                        "type": "DEPOSIT",
                        "amount": "100.00",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/accounts/{account_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let account = body_json(response).await;
    assert_eq!(account["balance"], "100.00");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transactions")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "account_id": account_id,
                        "type": "WITHDRAWAL",
                        "amount": "1000.00",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore]
async fn replaying_idempotency_key_returns_the_original_transaction() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let app = create_router(AppState::new(pool.clone()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts")
                .header("content-type", "application/json")
                .body(Body::from(json!({"name": "bob", "currency": "USD"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let account = body_json(response).await;
    let account_id = account["id"].as_str().unwrap().to_string();

    let build_request = || {
        Request::builder()
            .method("POST")
            .uri("/transactions")
            .header("content-type", "application/json")
            .header("Idempotency-Key", "replay-key")
            .body(Body::from(
                json!({
                    "account_id": account_id,
                    "type": "DEPOSIT",
                    "amount": "50.00",
                })
                .to_string(),
            ))
            .unwrap()
    };

    let first = app.clone().oneshot(build_request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;

    let second = app.clone().oneshot(build_request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);
    let second = body_json(second).await;

    assert_eq!(first["id"], second["id"]);

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore]
async fn health_and_liveness_endpoints_respond() {
    let pool = common::setup_test_db().await;
    let app = create_router(AppState::new(pool));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
