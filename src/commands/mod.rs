//! Command handlers for the agro CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod analyze;
mod ask;
mod auth;
mod init;
mod ledger;

use crate::finance::Finance;
use crate::ledger::LedgerStore;
use crate::notify::LogNotifier;
use crate::session::SessionUser;
use crate::Config;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use analyze::analyze;
pub use ask::ask;
pub use auth::{login, logout, register, whoami};
pub use init::init;
pub use ledger::{add, categories, chart, export, history, summary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data that is logged as JSON at debug level.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Opens the ledger in `config` on behalf of whoever is signed in. A ledger that cannot be read
/// has already been reported and starts out empty.
pub(crate) async fn open_finance(config: &Config) -> Finance<LogNotifier> {
    let storage = config.storage();
    let user = SessionUser::load(&storage).await;
    let ledger = LedgerStore::new(storage, user);
    let mut finance = Finance::new(
        ledger,
        LogNotifier,
        config.locale(),
        config.history_limit(),
    );
    if let Err(e) = finance.load().await {
        debug!("Continuing with an empty ledger: {e}");
    }
    finance
}
