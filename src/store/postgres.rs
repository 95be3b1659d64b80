use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::Session;
use crate::error::AppError;
use crate::models::{Account, Currency, LedgerEntry, TransactionRecord};
use crate::money::Money;

fn map_sqlx_err(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateIdempotencyKey(db_err.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => AppError::StoreUnavailable(e.to_string()),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("40001") => {
            AppError::Serialization(e.to_string())
        }
        _ => AppError::StoreUnavailable(e.to_string()),
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, AppError> {
    let currency_str: String = row.try_get("currency").map_err(map_sqlx_err)?;
    let balance_minor: i64 = row.try_get("balance").map_err(map_sqlx_err)?;
    Ok(Account {
        id: row.try_get("id").map_err(map_sqlx_err)?,
        name: row.try_get("name").map_err(map_sqlx_err)?,
        currency: Currency::parse(&currency_str)?,
        balance: Money::from_minor_units(balance_minor),
        created_at: row.try_get("created_at").map_err(map_sqlx_err)?,
        updated_at: row.try_get("updated_at").map_err(map_sqlx_err)?,
    })
}

/// PostgreSQL-backed `Store`, the production implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl super::Store for PgStore {
    type Session = PgSession;

    async fn begin(&self) -> Result<Self::Session, AppError> {
        let mut tx: Transaction<'static, Postgres> = self.pool.begin().await.map_err(map_sqlx_err)?;
        sqlx::query("SET LOCAL statement_timeout = 4000")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        Ok(PgSession { tx: Some(tx) })
    }

    async fn find_transaction_by_key(&self, key: &str) -> Result<Option<TransactionRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, idempotency_key, type, status, reference, created_at \
             FROM transactions WHERE idempotency_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(|r| {
            Ok(TransactionRecord {
                id: r.try_get("id").map_err(map_sqlx_err)?,
                idempotency_key: r.try_get("idempotency_key").map_err(map_sqlx_err)?,
                transaction_type: r.try_get("type").map_err(map_sqlx_err)?,
                status: r.try_get("status").map_err(map_sqlx_err)?,
                reference: r.try_get("reference").map_err(map_sqlx_err)?,
                created_at: r.try_get("created_at").map_err(map_sqlx_err)?,
            })
        })
        .transpose()
    }

    async fn create_account(&self, account: Account) -> Result<Account, AppError> {
        let row = sqlx::query(
            "INSERT INTO accounts (id, name, currency, balance, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, name, currency, balance, created_at, updated_at",
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(account.currency.as_str())
        .bind(account.balance.minor_units())
        .bind(account.created_at)
        .bind(account.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row_to_account(&row)
    }

    async fn get_account(&self, id: Uuid) -> Result<Account, AppError> {
        let row = sqlx::query(
            "SELECT id, name, currency, balance, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| AppError::AccountNotFound(id.to_string()))?;

        row_to_account(&row)
    }

    async fn get_account_history(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT id, transaction_id, account_id, amount, direction, created_at \
             FROM ledger_entries WHERE account_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|r| {
                let amount_minor: i64 = r.try_get("amount").map_err(map_sqlx_err)?;
                Ok(LedgerEntry {
                    id: r.try_get("id").map_err(map_sqlx_err)?,
                    transaction_id: r.try_get("transaction_id").map_err(map_sqlx_err)?,
                    account_id: r.try_get("account_id").map_err(map_sqlx_err)?,
                    amount: Money::from_minor_units(amount_minor),
                    direction: r.try_get("direction").map_err(map_sqlx_err)?,
                    created_at: r.try_get("created_at").map_err(map_sqlx_err)?,
                })
            })
            .collect()
    }
}

/// One PostgreSQL interactive transaction. `tx` is `None` only after `commit`/`rollback`
/// consume it; every other method call on a consumed session is a logic error.
pub struct PgSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    fn tx_mut(&mut self) -> &mut Transaction<'static, Postgres> {
        self.tx.as_mut().expect("session used after commit/rollback")
    }
}

#[async_trait]
impl Session for PgSession {
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, currency, balance, created_at, updated_at FROM accounts \
             WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(self.tx_mut())
        .await
        .map_err(map_sqlx_err)?;

        rows.iter().map(row_to_account).collect()
    }

    async fn insert_transaction(&mut self, tx: &TransactionRecord) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO transactions (id, idempotency_key, type, status, reference, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(tx.id)
        .bind(&tx.idempotency_key)
        .bind(tx.transaction_type)
        .bind(tx.status)
        .bind(&tx.reference)
        .bind(tx.created_at)
        .execute(self.tx_mut())
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn insert_entries(&mut self, entries: &[LedgerEntry]) -> Result<(), AppError> {
        for entry in entries {
            sqlx::query(
                "INSERT INTO ledger_entries (id, transaction_id, account_id, amount, direction, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(entry.id)
            .bind(entry.transaction_id)
            .bind(entry.account_id)
            .bind(entry.amount.minor_units())
            .bind(entry.direction)
            .bind(entry.created_at)
            .execute(self.tx_mut())
            .await
            .map_err(map_sqlx_err)?;
        }
        Ok(())
    }

    async fn update_balance(&mut self, account_id: Uuid, new_balance: Money) -> Result<(), AppError> {
        sqlx::query("UPDATE accounts SET balance = $1, updated_at = now() WHERE id = $2")
            .bind(new_balance.minor_units())
            .bind(account_id)
            .execute(self.tx_mut())
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AppError> {
        let tx = self.tx.take().expect("session used after commit/rollback");
        tx.commit().await.map_err(map_sqlx_err)
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), AppError> {
        let tx = self.tx.take().expect("session used after commit/rollback");
        tx.rollback().await.map_err(map_sqlx_err)
    }
}
