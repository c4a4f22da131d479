use crate::commands::Out;
use crate::present::Locale;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and an initial `config.json` that uses
/// `locale` along with default settings.
///
/// # Arguments
/// - `agro_home` - The directory that will be the root of data directory, e.g. `$HOME/agro`
/// - `locale` - How currency, dates and labels will be displayed.
///
/// # Errors
/// - Returns an error if any file operations fail or the directory is already initialized.
pub async fn init(agro_home: &Path, locale: Locale) -> Result<Out<()>> {
    let config = Config::create(agro_home, locale)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the agro directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("agro");
        let out = init(&home, Locale::EnUs).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert_eq!(Config::load(&home).await.unwrap().locale(), Locale::EnUs);
        assert!(init(&home, Locale::PtBr).await.is_err());
    }
}
