pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, LedgerEntry, TransactionRecord};
use crate::money::Money;

pub use postgres::PgStore;

/// Opens `Session`s against the underlying transactional store. One implementation
/// (`PgStore`) talks to PostgreSQL; another (`memory::MemoryStore`) is an in-process
/// test double with the same locking-order sensitivity.
#[async_trait]
pub trait Store: Send + Sync {
    type Session: Session;

    async fn begin(&self) -> Result<Self::Session, AppError>;

    /// Idempotency pre-check: a lock-free read usable outside any session.
    async fn find_transaction_by_key(&self, key: &str) -> Result<Option<TransactionRecord>, AppError>;

    async fn create_account(&self, account: Account) -> Result<Account, AppError>;

    async fn get_account(&self, id: Uuid) -> Result<Account, AppError>;

    async fn get_account_history(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntry>, AppError>;
}

/// One interactive store transaction, scoped to a single processor run.
#[async_trait]
pub trait Session: Send {
    /// Acquires an exclusive row lock on every account in `ids`, in a single call.
    /// `ids` must already be sorted by the caller (see `lock_manager`) so that two
    /// sessions locking overlapping sets always acquire them in the same order.
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<Account>, AppError>;

    async fn insert_transaction(&mut self, tx: &TransactionRecord) -> Result<(), AppError>;

    async fn insert_entries(&mut self, entries: &[LedgerEntry]) -> Result<(), AppError>;

    async fn update_balance(&mut self, account_id: Uuid, new_balance: Money) -> Result<(), AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
