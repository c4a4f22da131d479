//! Durable, string-keyed storage slots.
//!
//! Everything the app persists lives in a handful of named slots, each holding one JSON document.
//! The `Storage` trait abstracts over where those slots live so that the ledger can run against the
//! filesystem in the CLI and against memory in tests.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Slot holding the JSON array of transactions.
pub const TRANSACTIONS: &str = "appAgro_transactions";

/// Slot holding the JSON array of registered users.
pub const USERS: &str = "appAgro_users";

/// Slot holding the signed-in user, if any.
pub const USER: &str = "appAgro_user";

/// Slot holding the simulated session token.
pub const TOKEN: &str = "appAgro_token";

/// Slot holding the JSON array of saved crop analyses.
pub const ANALYSES: &str = "appAgro_analyses";

/// Errors reported by a `Storage` implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("writing {needed} bytes to '{key}' would exceed the storage quota of {quota} bytes")]
    QuotaExceeded {
        key: String,
        needed: u64,
        quota: u64,
    },

    #[error("'{0}' is not a valid storage key")]
    InvalidKey(String),

    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// A set of named slots, each holding a string value.
///
/// There is no coordination between two handles onto the same slots: the last `set` wins.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Returns the value of `key`, or `None` if the slot has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value of `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Clears `key`. Removing an absent slot is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Checks that the projected total size of all slots stays within `quota`.
fn check_quota(key: &str, projected: u64, quota: Option<u64>) -> Result<(), StorageError> {
    match quota {
        Some(quota) if projected > quota => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed: projected,
            quota,
        }),
        _ => Ok(()),
    }
}
