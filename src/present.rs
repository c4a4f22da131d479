//! Formatting for display: currency, dates, labels and the bounded list of recent transactions.

use crate::model::{Transaction, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How many recent transactions are shown unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// The display conventions used for currency, dates and labels.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian reais: `R$ 1.234,56`, `01/03/2024`.
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// US dollars: `$1,234.56`, `3/1/2024`.
    #[serde(rename = "en-US")]
    EnUs,
}

serde_plain::derive_display_from_serialize!(Locale);
serde_plain::derive_fromstr_from_deserialize!(Locale);

impl Locale {
    /// Formats `value` with the currency symbol, thousands grouping and two decimal places.
    pub fn format_currency(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let grouped = format_num::format_num!(",.2", rounded.abs().to_f64().unwrap_or_default());
        match self {
            Locale::PtBr => {
                let swapped: String = grouped
                    .chars()
                    .map(|c| match c {
                        ',' => '.',
                        '.' => ',',
                        other => other,
                    })
                    .collect();
                format!("{sign}R$ {swapped}")
            }
            Locale::EnUs => format!("{sign}${grouped}"),
        }
    }

    /// Formats the calendar date of `date` (taken in UTC).
    pub fn format_short_date(&self, date: DateTime<Utc>) -> String {
        match self {
            Locale::PtBr => date.format("%d/%m/%Y").to_string(),
            Locale::EnUs => date.format("%-m/%-d/%Y").to_string(),
        }
    }

    pub fn type_label(&self, kind: TransactionType) -> &'static str {
        match (self, kind) {
            (Locale::PtBr, TransactionType::Income) => "Receita",
            (Locale::PtBr, TransactionType::Expense) => "Despesa",
            (Locale::EnUs, TransactionType::Income) => "Income",
            (Locale::EnUs, TransactionType::Expense) => "Expense",
        }
    }
}

/// One display-ready line of transaction history.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub date: String,
    pub description: String,
    /// Formatted amount prefixed with `+` for income and `-` for expenses.
    pub amount: String,
    pub kind: TransactionType,
    pub category: &'static str,
    pub icon: &'static str,
}

/// The first `limit` transactions in ledger order, and how many more there are.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RecentView {
    pub rows: Vec<HistoryRow>,
    pub remaining: usize,
}

impl RecentView {
    pub fn has_more(&self) -> bool {
        self.remaining > 0
    }
}

/// Shapes at most `limit` transactions for display.
pub fn recent(transactions: &[Transaction], limit: usize, locale: Locale) -> RecentView {
    let shown = &transactions[..transactions.len().min(limit)];
    let rows = shown
        .iter()
        .map(|t| {
            let prefix = if t.is_income() { "+" } else { "-" };
            let category = t.category_id();
            HistoryRow {
                id: t.id().to_string(),
                date: locale.format_short_date(t.date()),
                description: t.description().to_string(),
                amount: format!("{prefix}{}", locale.format_currency(t.amount().value())),
                kind: t.kind(),
                category: category.name(),
                icon: category.icon(),
            }
        })
        .collect();
    RecentView {
        rows,
        remaining: transactions.len() - shown.len(),
    }
}
