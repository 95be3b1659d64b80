use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::Currency;
use crate::money::Money;

/// A ledger account: a named holder of a single-currency balance.
///
/// Accounts are immutable once created apart from their balance, which is mutated
/// only by the transaction processor under an exclusive row lock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account with a zero balance.
    pub fn new(name: String, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            currency,
            balance: Money::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_at_zero_balance() {
        let account = Account::new("Test".to_string(), Currency::Usd);
        assert_eq!(account.balance, Money::ZERO);
        assert_eq!(account.currency, Currency::Usd);
        assert_eq!(account.name, "Test");
    }

    #[test]
    fn each_account_gets_a_fresh_id() {
        let a = Account::new("A".to_string(), Currency::Usd);
        let b = Account::new("B".to_string(), Currency::Usd);
        assert_ne!(a.id, b.id);
    }
}
