//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::{Category, CategoryId, CATEGORIES};
pub use transaction::{
    max_amount, parse_date, sort_newest_first, NewTransaction, Transaction, TransactionType,
    GUEST, MAX_AMOUNT_CENTS, MAX_DECIMAL_PLACES,
};
