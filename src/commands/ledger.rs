//! Ledger command handlers.

use crate::aggregate::{ChartData, Totals};
use crate::args::{AddArgs, ExportArgs, HistoryArgs};
use crate::commands::{open_finance, Out};
use crate::model::{Category, NewTransaction, Transaction, CATEGORIES};
use crate::present::RecentView;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Utc;
use std::fmt::Write;
use std::path::PathBuf;

/// Records a new transaction on behalf of the signed-in user, or the guest.
///
/// # Errors
/// - Returns an error if the input is invalid. Nothing is recorded.
/// - Returns an error if the ledger cannot be saved. The transaction is not persisted.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Transaction>> {
    let mut finance = open_finance(&config).await;
    let input = NewTransaction::new(
        args.description(),
        args.amount(),
        args.kind(),
        args.date(),
        args.category(),
    );
    let transaction = finance.add(&input).await?;
    let locale = finance.locale();
    let message = format!(
        "Recorded {} '{}' of {} on {}",
        locale.type_label(transaction.kind()).to_lowercase(),
        transaction.description(),
        locale.format_currency(transaction.amount().value()),
        locale.format_short_date(transaction.date()),
    );
    Ok(Out::new(message, transaction))
}

/// Reports total income, total expenses and the balance, followed by a per-category table.
pub async fn summary(config: Config) -> Result<Out<Totals>> {
    let finance = open_finance(&config).await;
    let totals = finance.totals();
    let locale = finance.locale();
    let mut message = format!(
        "Income: {}, Expenses: {}, Balance: {}",
        locale.format_currency(totals.income),
        locale.format_currency(totals.expenses),
        locale.format_currency(totals.balance),
    );
    for row in finance.by_category().rows() {
        if row.income.is_zero() && row.expense.is_zero() {
            continue;
        }
        let _ = write!(
            message,
            "\n  {:<14} {} in, {} out",
            row.category.name(),
            locale.format_currency(row.income),
            locale.format_currency(row.expense),
        );
    }
    Ok(Out::new(message, totals))
}

/// Produces the category chart series: labels with income and expense totals, index-aligned in
/// display order.
pub async fn chart(config: Config) -> Result<Out<ChartData>> {
    let finance = open_finance(&config).await;
    let data = finance.chart_data();
    let json = serde_json::to_string(&data).context("Unable to serialize the chart data")?;
    Ok(Out::new(json, data))
}

/// Lists the most recent transactions, newest first. `args.limit()` overrides the configured
/// history length.
pub async fn history(config: Config, args: HistoryArgs) -> Result<Out<RecentView>> {
    let finance = open_finance(&config).await;
    let view = match args.limit() {
        Some(limit) => finance.recent_with_limit(limit),
        None => finance.recent(),
    };
    if view.rows.is_empty() {
        return Ok(Out::new("No transactions recorded", view));
    }
    let mut message = String::from("Recent transactions:");
    for row in &view.rows {
        let _ = write!(
            message,
            "\n  {}  {}  {}  {}",
            row.date, row.description, row.amount, row.category
        );
    }
    if view.has_more() {
        let _ = write!(message, "\n  ...and {} more", view.remaining);
    }
    Ok(Out::new(message, view))
}

/// Lists the fixed transaction categories.
pub async fn categories() -> Result<Out<Vec<Category>>> {
    let mut message = String::from("Categories:");
    for c in CATEGORIES.iter() {
        let _ = write!(message, "\n  {:<11} {}", c.id, c.name);
    }
    Ok(Out::new(message, CATEGORIES.to_vec()))
}

/// Writes every transaction, in ledger order, to a CSV file in `args.out()` or the configured
/// export directory, and returns its path.
///
/// # Errors
/// - Returns an error if there are no transactions or the file cannot be written.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let finance = open_finance(&config).await;
    let dir = match args.out() {
        Some(dir) => dir.to_path_buf(),
        None => config.export_dir(),
    };
    let artifact = finance.export(Utc::now())?;
    utils::make_dir(&dir).await?;
    let path = artifact.write_to(&dir).await?;
    Ok(Out::new(
        format!(
            "Exported {} transactions to {}",
            finance.transactions().len(),
            path.display()
        ),
        path,
    ))
}
