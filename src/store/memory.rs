use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::Session;
use crate::error::AppError;
use crate::models::{Account, LedgerEntry, TransactionRecord};
use crate::money::Money;

struct Row {
    account: Account,
    lock: Arc<Mutex<()>>,
}

/// In-memory `Store` test double. Mirrors the PostgreSQL implementation's
/// observable behavior: locking is sensitive to acquisition order (a per-account
/// `tokio::sync::Mutex`, taken in the order the caller supplies, deadlocking the
/// same way untimed `FOR UPDATE` would if callers disagreed on order), and
/// duplicate idempotency keys are rejected at "commit" time exactly as the unique
/// index would reject them.
#[derive(Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Row>,
    transactions: HashMap<Uuid, TransactionRecord>,
    transactions_by_key: HashMap<String, Uuid>,
    entries: Vec<LedgerEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::Store for MemoryStore {
    type Session = MemorySession;

    async fn begin(&self) -> Result<Self::Session, AppError> {
        Ok(MemorySession {
            inner: self.inner.clone(),
            held_locks: Vec::new(),
            pending_accounts: HashMap::new(),
            pending_transaction: None,
            pending_entries: Vec::new(),
            pending_balances: HashMap::new(),
        })
    }

    async fn find_transaction_by_key(&self, key: &str) -> Result<Option<TransactionRecord>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .transactions_by_key
            .get(key)
            .and_then(|id| inner.transactions.get(id))
            .cloned())
    }

    async fn create_account(&self, account: Account) -> Result<Account, AppError> {
        let mut inner = self.inner.lock().await;
        inner.accounts.insert(
            account.id,
            Row {
                account: account.clone(),
                lock: Arc::new(Mutex::new(())),
            },
        );
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> Result<Account, AppError> {
        let inner = self.inner.lock().await;
        inner
            .accounts
            .get(&id)
            .map(|r| r.account.clone())
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    }

    async fn get_account_history(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let inner = self.inner.lock().await;
        let mut matching: Vec<LedgerEntry> = inner
            .entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

/// A session's view of the store: per-account mutex guards held for the session's
/// lifetime, plus a staged set of writes applied atomically at `commit`.
pub struct MemorySession {
    inner: Arc<Mutex<Inner>>,
    held_locks: Vec<OwnedMutexGuard<()>>,
    pending_accounts: HashMap<Uuid, Account>,
    pending_transaction: Option<TransactionRecord>,
    pending_entries: Vec<LedgerEntry>,
    pending_balances: HashMap<Uuid, Money>,
}

#[async_trait]
impl Session for MemorySession {
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<Account>, AppError> {
        let mut sorted: Vec<Uuid> = ids.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut out = Vec::with_capacity(sorted.len());
        for id in &sorted {
            let lock = {
                let inner = self.inner.lock().await;
                match inner.accounts.get(id) {
                    Some(row) => row.lock.clone(),
                    None => continue,
                }
            };
            // Acquire the per-account guard before re-reading the row: the snapshot
            // taken above may be stale by the time we hold the lock, since another
            // session could commit a balance change in between.
            let guard = lock.lock_owned().await;
            let account = {
                let inner = self.inner.lock().await;
                match inner.accounts.get(id) {
                    Some(row) => row.account.clone(),
                    None => continue,
                }
            };
            self.held_locks.push(guard);
            self.pending_accounts.insert(*id, account.clone());
            out.push(account);
        }
        Ok(out)
    }

    async fn insert_transaction(&mut self, tx: &TransactionRecord) -> Result<(), AppError> {
        if let Some(key) = &tx.idempotency_key {
            let inner = self.inner.lock().await;
            if inner.transactions_by_key.contains_key(key) {
                return Err(AppError::DuplicateIdempotencyKey(key.clone()));
            }
        }
        self.pending_transaction = Some(tx.clone());
        Ok(())
    }

    async fn insert_entries(&mut self, entries: &[LedgerEntry]) -> Result<(), AppError> {
        self.pending_entries.extend_from_slice(entries);
        Ok(())
    }

    async fn update_balance(&mut self, account_id: Uuid, new_balance: Money) -> Result<(), AppError> {
        self.pending_balances.insert(account_id, new_balance);
        if let Some(account) = self.pending_accounts.get_mut(&account_id) {
            account.balance = new_balance;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;

        if let Some(tx) = &self.pending_transaction {
            if let Some(key) = &tx.idempotency_key {
                if inner.transactions_by_key.contains_key(key) {
                    return Err(AppError::DuplicateIdempotencyKey(key.clone()));
                }
            }
        }

        for (account_id, balance) in &self.pending_balances {
            if let Some(row) = inner.accounts.get_mut(account_id) {
                row.account.balance = *balance;
                row.account.updated_at = chrono::Utc::now();
            }
        }

        if let Some(tx) = self.pending_transaction {
            if let Some(key) = tx.idempotency_key.clone() {
                inner.transactions_by_key.insert(key, tx.id);
            }
            inner.transactions.insert(tx.id, tx);
        }

        inner.entries.extend(self.pending_entries);

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}
