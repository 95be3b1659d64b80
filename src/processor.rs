use uuid::Uuid;

use crate::error::AppError;
use crate::idempotency::{self, CheckResult};
use crate::lock_manager;
use crate::models::{Account, Direction, LedgerEntry, TransactionRecord, TransactionType};
use crate::money::Money;
use crate::store::{Session, Store};

const MAX_TRANSIENT_RETRIES: u32 = 2;

/// A validated request to apply one transaction. Construction (via `new`) enforces
/// the request-boundary checks that never require a lock: positive amount and
/// sender != receiver on transfers.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub account_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub reference: Option<String>,
    pub receiver_id: Option<Uuid>,
}

impl TransactionRequest {
    pub fn new(
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: Money,
        reference: Option<String>,
        receiver_id: Option<Uuid>,
    ) -> Result<Self, AppError> {
        if !amount.is_positive() {
            return Err(AppError::InvalidAmount("amount must be strictly positive".into()));
        }
        if transaction_type == TransactionType::Transfer {
            let receiver = receiver_id
                .ok_or_else(|| AppError::BadRequest("receiver_id is required for TRANSFER".into()))?;
            if receiver == account_id {
                return Err(AppError::BadRequest("cannot transfer to the same account".into()));
            }
        }
        Ok(Self {
            account_id,
            transaction_type,
            amount,
            reference,
            receiver_id,
        })
    }
}

/// Drives a single transaction request through the processor state machine:
/// idempotency pre-check, locking, validation, application, recording, and commit.
/// Retries transient store errors up to `MAX_TRANSIENT_RETRIES` times, and retries
/// the idempotency pre-check exactly once if the commit is rejected as a duplicate.
pub async fn process_transaction<S: Store>(
    store: &S,
    request: TransactionRequest,
    idempotency_key: Option<String>,
) -> Result<TransactionRecord, AppError> {
    if let CheckResult::Hit(existing) = idempotency::check(store, idempotency_key.as_deref()).await? {
        return Ok(*existing);
    }

    let mut attempt = 0;
    loop {
        match try_once(store, &request, idempotency_key.as_deref()).await {
            Ok(tx) => return Ok(tx),
            Err(AppError::DuplicateIdempotencyKey(_)) => {
                // Lost the race to a concurrent identical request; the unique index is
                // authoritative, so the stored row now exists - fetch and return it.
                if let CheckResult::Hit(existing) =
                    idempotency::check(store, idempotency_key.as_deref()).await?
                {
                    return Ok(*existing);
                }
                return Err(AppError::Internal(anyhow::anyhow!(
                    "commit reported a duplicate idempotency key but none was found on re-check"
                )));
            }
            Err(e @ (AppError::StoreUnavailable(_) | AppError::Serialization(_))) => {
                attempt += 1;
                if attempt > MAX_TRANSIENT_RETRIES {
                    return Err(e);
                }
                tracing::warn!(attempt, error = %e, "retrying transaction after transient store error");
            }
            Err(e) => return Err(e),
        }
    }
}

async fn try_once<S: Store>(
    store: &S,
    request: &TransactionRequest,
    idempotency_key: Option<&str>,
) -> Result<TransactionRecord, AppError> {
    let lock_ids = lock_manager::accounts_to_lock(
        request.transaction_type,
        request.account_id,
        request.receiver_id,
    );

    let mut session = store.begin().await?;
    let result = run_in_session(&mut session, request, idempotency_key, &lock_ids).await;

    match result {
        Ok(tx) => {
            Box::new(session).commit().await?;
            Ok(tx)
        }
        Err(e) => {
            // Best-effort: a failed rollback must not mask the original error.
            let _ = Box::new(session).rollback().await;
            Err(e)
        }
    }
}

async fn run_in_session<Sess: Session>(
    session: &mut Sess,
    request: &TransactionRequest,
    idempotency_key: Option<&str>,
    lock_ids: &[Uuid],
) -> Result<TransactionRecord, AppError> {
    let locked = session.lock_accounts(lock_ids).await?;

    let find = |id: Uuid| -> Result<Account, AppError> {
        locked
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    };

    let sender = find(request.account_id)?;

    let (tx, entries, balance_updates) = match request.transaction_type {
        TransactionType::Deposit => {
            let new_balance = sender.balance.checked_add(request.amount)?;
            let tx = TransactionRecord::new(
                TransactionType::Deposit,
                idempotency_key.map(str::to_string),
                request.reference.clone(),
            );
            let entry = LedgerEntry::credit(tx.id, sender.id, request.amount);
            (tx, vec![entry], vec![(sender.id, new_balance)])
        }
        TransactionType::Withdrawal => {
            if sender.balance < request.amount {
                return Err(AppError::InsufficientFunds(format!(
                    "account {} has balance {} but withdrawal requires {}",
                    sender.id, sender.balance, request.amount
                )));
            }
            let new_balance = sender.balance.checked_sub(request.amount)?;
            let tx = TransactionRecord::new(
                TransactionType::Withdrawal,
                idempotency_key.map(str::to_string),
                request.reference.clone(),
            );
            let entry = LedgerEntry::debit(tx.id, sender.id, request.amount)?;
            (tx, vec![entry], vec![(sender.id, new_balance)])
        }
        TransactionType::Transfer => {
            let receiver_id = request
                .receiver_id
                .expect("TransactionRequest::new guarantees receiver_id for transfers");
            let receiver = find(receiver_id)?;

            if sender.currency != receiver.currency {
                return Err(AppError::CurrencyMismatch(format!(
                    "sender currency {} does not match receiver currency {}",
                    sender.currency, receiver.currency
                )));
            }
            if sender.balance < request.amount {
                return Err(AppError::InsufficientFunds(format!(
                    "account {} has balance {} but transfer requires {}",
                    sender.id, sender.balance, request.amount
                )));
            }

            let sender_new = sender.balance.checked_sub(request.amount)?;
            let receiver_new = receiver.balance.checked_add(request.amount)?;

            let tx = TransactionRecord::new(
                TransactionType::Transfer,
                idempotency_key.map(str::to_string),
                request.reference.clone(),
            );
            let debit = LedgerEntry::debit(tx.id, sender.id, request.amount)?;
            let credit = LedgerEntry::credit(tx.id, receiver.id, request.amount);
            debug_assert_eq!(debit.direction, Direction::Debit);
            (
                tx,
                vec![debit, credit],
                vec![(sender.id, sender_new), (receiver.id, receiver_new)],
            )
        }
    };

    session.insert_transaction(&tx).await?;
    session.insert_entries(&entries).await?;
    for (account_id, new_balance) in balance_updates {
        session.update_balance(account_id, new_balance).await?;
    }

    Ok(tx)
}
