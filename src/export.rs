//! CSV export of the ledger.

use crate::error::{LedgerError, Result};
use crate::model::Transaction;
use crate::present::Locale;
use crate::utils;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// The first line of every export.
pub const CSV_HEADER: &str = "Date,Description,Amount,Type,Category";

/// The media type of an export.
pub const CSV_MIME: &str = "text/csv; charset=utf-8";

const FILE_PREFIX: &str = "app-agro-financas";

/// A finished export, ready to be written or offered for download.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub contents: String,
}

impl ExportArtifact {
    /// Writes the contents to `dir/<file_name>` and returns the path.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        utils::write(&path, &self.contents)
            .await
            .context("Unable to write the export file")?;
        Ok(path)
    }
}

/// Builds CSV exports of a ledger snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Exporter {
    locale: Locale,
}

impl Exporter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Renders `transactions`, in the order given, as CSV text.
    ///
    /// Returns `LedgerError::EmptyExport` when there is nothing to export.
    pub fn to_csv(&self, transactions: &[Transaction]) -> std::result::Result<String, LedgerError> {
        if transactions.is_empty() {
            return Err(LedgerError::EmptyExport);
        }
        let mut csv = String::with_capacity(64 * (transactions.len() + 1));
        csv.push_str(CSV_HEADER);
        csv.push('\n');
        for t in transactions {
            // Writing to a String cannot fail.
            let _ = writeln!(
                csv,
                "{},{},{},{},{}",
                self.locale.format_short_date(t.date()),
                quote(t.description()),
                t.amount(),
                self.locale.type_label(t.kind()),
                t.category_id().name(),
            );
        }
        Ok(csv)
    }

    /// Renders `transactions` and names the result after `now`.
    pub fn export(
        &self,
        transactions: &[Transaction],
        now: DateTime<Utc>,
    ) -> std::result::Result<ExportArtifact, LedgerError> {
        Ok(ExportArtifact {
            file_name: file_name(now),
            mime: CSV_MIME,
            contents: self.to_csv(transactions)?,
        })
    }
}

/// `app-agro-financas-<epoch millis>.csv`
pub fn file_name(now: DateTime<Utc>) -> String {
    format!("{FILE_PREFIX}-{}.csv", now.timestamp_millis())
}

/// Wraps `field` in double quotes, doubling any quotes inside it.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTransaction, GUEST};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn tx(description: &str, amount: &str, kind: &str, category: &str) -> Transaction {
        let input = NewTransaction::new(description, amount, kind, "2024-03-01", category);
        Transaction::create(&input, Locale::EnUs, "1", GUEST).unwrap()
    }

    #[test]
    fn test_empty_ledger() {
        let exporter = Exporter::default();
        assert!(matches!(exporter.to_csv(&[]), Err(LedgerError::EmptyExport)));
        assert!(matches!(
            exporter.export(&[], Utc::now()),
            Err(LedgerError::EmptyExport)
        ));
    }

    #[test]
    fn test_rows_in_ledger_order() {
        let ledger = vec![
            tx("Venda de milho", "1000.00", "income", "sales"),
            tx("Sementes", "150.50", "expense", "seeds"),
            tx("Ração", "30", "expense", "livestock"),
        ];
        let csv = Exporter::new(Locale::PtBr).to_csv(&ledger).unwrap();
        assert_eq!(
            csv,
            "Date,Description,Amount,Type,Category\n\
             01/03/2024,\"Venda de milho\",1000,Receita,Vendas\n\
             01/03/2024,\"Sementes\",150.5,Despesa,Sementes\n\
             01/03/2024,\"Ração\",30,Despesa,Outros\n"
        );
    }

    #[test]
    fn test_quotes_are_doubled() {
        let ledger = vec![tx("He said \"hi\"", "1", "expense", "other")];
        let csv = Exporter::default().to_csv(&ledger).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",\"He said \"\"hi\"\"\","), "{row}");
    }

    #[test]
    fn test_commas_stay_inside_the_field() {
        let ledger = vec![tx("Adubo, calcário", "1", "expense", "fertilizer")];
        let csv = Exporter::new(Locale::EnUs).to_csv(&ledger).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "3/1/2024,\"Adubo, calcário\",1,Expense,Fertilizantes"
        );
    }

    #[test]
    fn test_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(file_name(now), "app-agro-financas-1709251200000.csv");
    }

    #[tokio::test]
    async fn test_write_artifact() {
        let dir = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let artifact = Exporter::default()
            .export(&[tx("Sementes", "150", "expense", "seeds")], now)
            .unwrap();
        assert_eq!(artifact.mime, "text/csv; charset=utf-8");
        let path = artifact.write_to(dir.path()).await.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "app-agro-financas-1709251200000.csv"
        );
        let written = utils::read(&path).await.unwrap();
        assert_eq!(written, artifact.contents);
    }
}
