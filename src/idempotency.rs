use crate::error::AppError;
use crate::models::TransactionRecord;
use crate::store::Store;

/// Result of the idempotency pre-check.
pub enum CheckResult {
    /// No prior transaction under this key (or no key was supplied): proceed.
    Miss,
    /// A prior transaction exists: return it unchanged, never reprocess.
    Hit(Box<TransactionRecord>),
}

/// Looks up a transaction by idempotency key. This is the lock-free, optimistic
/// half of the two-level scheme described for the processor; the authoritative
/// half is the store's unique index, enforced at commit time inside
/// `Session::insert_transaction`.
pub async fn check<S: Store>(store: &S, key: Option<&str>) -> Result<CheckResult, AppError> {
    let Some(key) = key else {
        return Ok(CheckResult::Miss);
    };

    match store.find_transaction_by_key(key).await? {
        Some(tx) => Ok(CheckResult::Hit(Box::new(tx))),
        None => Ok(CheckResult::Miss),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn no_key_is_always_a_miss() {
        let store = MemoryStore::new();
        let result = check(&store, None).await.unwrap();
        assert!(matches!(result, CheckResult::Miss));
    }

    #[tokio::test]
    async fn unknown_key_is_a_miss() {
        let store = MemoryStore::new();
        let result = check(&store, Some("nope")).await.unwrap();
        assert!(matches!(result, CheckResult::Miss));
    }

    #[tokio::test]
    async fn known_key_is_a_hit() {
        use crate::store::Session;

        let store = MemoryStore::new();
        let tx = TransactionRecord::new(TransactionType::Deposit, Some("k1".to_string()), None);

        let mut session = store.begin().await.unwrap();
        session.insert_transaction(&tx).await.unwrap();
        Box::new(session).commit().await.unwrap();

        let result = check(&store, Some("k1")).await.unwrap();
        match result {
            CheckResult::Hit(found) => assert_eq!(found.id, tx.id),
            CheckResult::Miss => panic!("expected a hit"),
        }
    }
}
