pub mod account;
pub mod currency;
pub mod ledger_entry;
pub mod transaction;

pub use account::Account;
pub use currency::Currency;
pub use ledger_entry::{Direction, LedgerEntry};
pub use transaction::{TransactionRecord, TransactionStatus, TransactionType};
