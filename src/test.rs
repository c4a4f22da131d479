//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::present::Locale;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up an agro home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment using the default pt-BR locale.
    pub async fn new() -> Self {
        Self::with_locale(Locale::PtBr).await
    }

    pub async fn with_locale(locale: Locale) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("agro");
        let config = Config::create(&root, locale).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}
