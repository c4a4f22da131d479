//! Error types.
//!
//! Application flow uses `anyhow` through the `Error` and `Result` aliases. Ledger operations
//! return `LedgerError` so that callers can tell a bad submission apart from a storage failure and
//! turn either into a user notification.

use crate::notify::Severity;
use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The failures a ledger operation can report.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The submitted transaction was rejected. Nothing was changed.
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    /// The durable store could not be read, parsed or written.
    #[error("unable to {action} transactions: {message}")]
    Persistence {
        action: &'static str,
        message: String,
    },

    /// There is nothing in the ledger to export.
    #[error("there are no transactions to export")]
    EmptyExport,
}

impl LedgerError {
    pub(crate) fn persistence(action: &'static str, e: impl std::fmt::Display) -> Self {
        LedgerError::Persistence {
            action,
            message: format!("{e:#}"),
        }
    }

    /// How a user-facing notification for this error should be presented.
    pub fn severity(&self) -> Severity {
        match self {
            LedgerError::Validation(_) | LedgerError::EmptyExport => Severity::Warning,
            LedgerError::Persistence { .. } => Severity::Error,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, LedgerError::Persistence { .. })
    }
}

/// The reasons a submitted transaction can be rejected.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("the description is empty")]
    EmptyDescription,
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("the amount must be greater than zero")]
    NonPositiveAmount,
    #[error("'{0}' has more than two decimal places")]
    TooManyDecimalPlaces(String),
    #[error("'{0}' is larger than the largest accepted amount, 999,999,999,999.99")]
    AmountTooLarge(String),
    #[error("'{0}' is not a valid date")]
    InvalidDate(String),
    #[error("'{0}' is not a transaction type, expected 'income' or 'expense'")]
    InvalidType(String),
    #[error("the category is missing")]
    MissingCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        let e = LedgerError::from(ValidationError::EmptyDescription);
        assert_eq!(e.severity(), Severity::Warning);
        assert!(e.is_validation());
        assert_eq!(LedgerError::EmptyExport.severity(), Severity::Warning);
        let e = LedgerError::persistence("save", "quota exceeded");
        assert_eq!(e.severity(), Severity::Error);
        assert!(e.is_persistence());
    }

    #[test]
    fn test_persistence_message() {
        let e = LedgerError::persistence("load", anyhow::anyhow!("expected value at line 1"));
        assert_eq!(
            e.to_string(),
            "unable to load transactions: expected value at line 1"
        );
    }
}
