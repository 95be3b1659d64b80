use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Type of transaction the processor can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionType {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Transfer => "TRANSFER",
        }
    }

    fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            "TRANSFER" => Ok(TransactionType::Transfer),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unrecognized transaction type '{other}' in store"
            ))),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for TransactionType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TransactionType {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        TransactionType::from_str(&s).map_err(|e| e.to_string().into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for TransactionType {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Status of a transaction. Only `Completed` is ever durably persisted by this
/// core: a transaction that fails validation or hits an unrecoverable store error
/// rolls back entirely rather than being recorded as `Failed`. The column is kept
/// for forward compatibility with asynchronous settlement flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }

    fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unrecognized transaction status '{other}' in store"
            ))),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for TransactionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TransactionStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        TransactionStatus::from_str(&s).map_err(|e| e.to_string().into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for TransactionStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// A committed transaction header. One or two `LedgerEntry` rows hang off of it
/// depending on `transaction_type` (see invariants I2/I3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub idempotency_key: Option<String>,
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(
        transaction_type: TransactionType,
        idempotency_key: Option<String>,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            idempotency_key,
            transaction_type,
            status: TransactionStatus::Completed,
            reference,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transaction_is_completed() {
        let tx = TransactionRecord::new(TransactionType::Deposit, None, None);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.transaction_type, TransactionType::Deposit);
    }

    #[test]
    fn carries_an_optional_idempotency_key() {
        let tx = TransactionRecord::new(
            TransactionType::Withdrawal,
            Some("key-1".to_string()),
            Some("payroll run".to_string()),
        );
        assert_eq!(tx.idempotency_key.as_deref(), Some("key-1"));
        assert_eq!(tx.reference.as_deref(), Some("payroll run"));
    }
}
