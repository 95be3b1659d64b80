mod common;

use ledger_engine::models::{Account, Currency, TransactionType};
use ledger_engine::processor::{self, TransactionRequest};
use ledger_engine::store::{PgStore, Store};

#[tokio::test]
#[ignore]
async fn deposit_then_withdraw_leaves_expected_balance() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let store = PgStore::new(pool.clone());

    let account = store
        .create_account(Account::new("alice".to_string(), Currency::Usd))
        .await
        .unwrap();

    let deposit = TransactionRequest::new(
        account.id,
        TransactionType::Deposit,
        "100.00".parse().unwrap(),
        None,
        None,
    )
    .unwrap();
    processor::process_transaction(&store, deposit, None).await.unwrap();

    let withdrawal = TransactionRequest::new(
        account.id,
        TransactionType::Withdrawal,
        "40.00".parse().unwrap(),
        None,
        None,
    )
    .unwrap();
    processor::process_transaction(&store, withdrawal, None).await.unwrap();

    let account = store.get_account(account.id).await.unwrap();
    assert_eq!(account.balance.to_string(), "60.00");

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore]
async fn transfer_moves_funds_between_accounts_of_the_same_currency() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let store = PgStore::new(pool.clone());

    let sender = store
        .create_account(Account::new("sender".to_string(), Currency::Usd))
        .await
        .unwrap();
    let receiver = store
        .create_account(Account::new("receiver".to_string(), Currency::Usd))
        .await
        .unwrap();

    let deposit = TransactionRequest::new(
        sender.id,
        TransactionType::Deposit,
        "200.00".parse().unwrap(),
        None,
        None,
    )
    .unwrap();
    processor::process_transaction(&store, deposit, None).await.unwrap();

    let transfer = TransactionRequest::new(
        sender.id,
        TransactionType::Transfer,
        "75.00".parse().unwrap(),
        None,
        Some(receiver.id),
    )
    .unwrap();
    processor::process_transaction(&store, transfer, None).await.unwrap();

    let sender = store.get_account(sender.id).await.unwrap();
    let receiver = store.get_account(receiver.id).await.unwrap();
    assert_eq!(sender.balance.to_string(), "125.00");
    assert_eq!(receiver.balance.to_string(), "75.00");

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore]
async fn transfer_across_currencies_is_rejected() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let store = PgStore::new(pool.clone());

    let usd = store
        .create_account(Account::new("usd-holder".to_string(), Currency::Usd))
        .await
        .unwrap();
    let inr = store
        .create_account(Account::new("inr-holder".to_string(), Currency::Inr))
        .await
        .unwrap();

    let deposit = TransactionRequest::new(
        usd.id,
        TransactionType::Deposit,
        "500.00".parse().unwrap(),
        None,
        None,
    )
    .unwrap();
    processor::process_transaction(&store, deposit, None).await.unwrap();

    let transfer = TransactionRequest::new(
        usd.id,
        TransactionType::Transfer,
        "10.00".parse().unwrap(),
        None,
        Some(inr.id),
    )
    .unwrap();
    let result = processor::process_transaction(&store, transfer, None).await;
    assert!(matches!(result, Err(ledger_engine::error::AppError::CurrencyMismatch(_))));

    let usd = store.get_account(usd.id).await.unwrap();
    assert_eq!(usd.balance.to_string(), "500.00");

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
#[ignore]
async fn replaying_an_idempotency_key_does_not_double_apply() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let store = PgStore::new(pool.clone());

    let account = store
        .create_account(Account::new("carol".to_string(), Currency::Usd))
        .await
        .unwrap();

    let key = Some("pay-run-42".to_string());
    let deposit = TransactionRequest::new(
        account.id,
        TransactionType::Deposit,
        "30.00".parse().unwrap(),
        None,
        None,
    )
    .unwrap();
    let first = processor::process_transaction(&store, deposit.clone(), key.clone()).await.unwrap();
    let second = processor::process_transaction(&store, deposit, key).await.unwrap();

    assert_eq!(first.id, second.id);
    let account = store.get_account(account.id).await.unwrap();
    assert_eq!(account.balance.to_string(), "30.00");

    common::cleanup_test_data(&pool).await;
}
