use uuid::Uuid;

use crate::models::TransactionType;

/// Computes the set of account ids a transaction needs locked, sorted in a total,
/// deterministic order so two transactions touching overlapping accounts always
/// acquire their shared locks in the same order. This is the sole guarantee
/// against deadlock; every lock acquisition must go through a single batched call
/// (see `Session::lock_accounts`) with this ordering.
pub fn accounts_to_lock(
    transaction_type: TransactionType,
    account_id: Uuid,
    receiver_id: Option<Uuid>,
) -> Vec<Uuid> {
    let mut ids = match transaction_type {
        TransactionType::Deposit | TransactionType::Withdrawal => vec![account_id],
        TransactionType::Transfer => {
            let mut ids = vec![account_id];
            if let Some(receiver) = receiver_id {
                ids.push(receiver);
            }
            ids
        }
    };
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_and_withdrawal_lock_one_account() {
        let id = Uuid::new_v4();
        assert_eq!(accounts_to_lock(TransactionType::Deposit, id, None), vec![id]);
        assert_eq!(accounts_to_lock(TransactionType::Withdrawal, id, None), vec![id]);
    }

    #[test]
    fn transfer_locks_are_sorted_regardless_of_input_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let forward = accounts_to_lock(TransactionType::Transfer, a, Some(b));
        let backward = accounts_to_lock(TransactionType::Transfer, b, Some(a));

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn transfer_to_self_dedupes_to_one_lock() {
        let a = Uuid::new_v4();
        assert_eq!(accounts_to_lock(TransactionType::Transfer, a, Some(a)), vec![a]);
    }
}
