pub mod aggregate;
pub mod analysis;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod finance;
pub mod intent;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod present;
pub mod session;
pub mod storage;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::Error;
pub use error::{LedgerError, Result, ValidationError};
pub use finance::Finance;
