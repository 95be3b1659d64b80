use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Request to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub currency: String,
}

/// Request to process a transaction. `type` selects which of `receiver_id` is
/// required; validation of the combination happens in `processor::TransactionRequest::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub amount: Money,
    pub reference: Option<String>,
    pub receiver_id: Option<Uuid>,
}

/// Query parameters for `GET /accounts/:id/history`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl HistoryQuery {
    /// Clamps `limit` to [1, 1000] and `offset` to >= 0, per the external API contract.
    pub fn clamped(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(100).clamp(1, 1000);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_query_defaults() {
        let query = HistoryQuery::default();
        assert_eq!(query.clamped(), (100, 0));
    }

    #[test]
    fn history_query_clamps_limit_and_offset() {
        let query = HistoryQuery {
            limit: Some(5000),
            offset: Some(-10),
        };
        assert_eq!(query.clamped(), (1000, 0));
    }
}
