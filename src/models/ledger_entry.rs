use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::money::Money;

/// Direction of a ledger entry. `Debit` carries a negative signed amount,
/// `Credit` a positive one; see invariants I2/I3 for which transaction types
/// produce which directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "DEBIT",
            Direction::Credit => "CREDIT",
        }
    }

    fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "DEBIT" => Ok(Direction::Debit),
            "CREDIT" => Ok(Direction::Credit),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unrecognized ledger direction '{other}' in store"
            ))),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for Direction {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Direction {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Direction::from_str(&s).map_err(|e| e.to_string().into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Direction {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// A single immutable posting against one account as part of one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    /// Signed amount: negative for DEBIT, positive for CREDIT.
    pub amount: Money,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Builds a debit entry. `magnitude` must be the unsigned amount removed from the account.
    pub fn debit(transaction_id: Uuid, account_id: Uuid, magnitude: Money) -> Result<Self, AppError> {
        Ok(Self {
            id: Uuid::new_v4(),
            transaction_id,
            account_id,
            amount: magnitude.checked_neg()?,
            direction: Direction::Debit,
            created_at: Utc::now(),
        })
    }

    /// Builds a credit entry. `magnitude` must be the unsigned amount added to the account.
    pub fn credit(transaction_id: Uuid, account_id: Uuid, magnitude: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            account_id,
            amount: magnitude,
            direction: Direction::Credit,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_amount_is_negative() {
        let entry = LedgerEntry::debit(Uuid::new_v4(), Uuid::new_v4(), Money::parse("40.00").unwrap()).unwrap();
        assert_eq!(entry.direction, Direction::Debit);
        assert!(entry.amount.is_negative());
        assert_eq!(entry.amount.to_string(), "-40.00");
    }

    #[test]
    fn credit_amount_is_positive() {
        let entry = LedgerEntry::credit(Uuid::new_v4(), Uuid::new_v4(), Money::parse("40.00").unwrap());
        assert_eq!(entry.direction, Direction::Credit);
        assert!(entry.amount.is_positive());
    }

    #[test]
    fn a_transfer_pair_sums_to_zero() {
        let tx_id = Uuid::new_v4();
        let debit = LedgerEntry::debit(tx_id, Uuid::new_v4(), Money::parse("30.00").unwrap()).unwrap();
        let credit = LedgerEntry::credit(tx_id, Uuid::new_v4(), Money::parse("30.00").unwrap());
        assert_eq!(debit.amount.checked_add(credit.amount).unwrap(), Money::ZERO);
    }
}
