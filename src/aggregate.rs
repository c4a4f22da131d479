//! Derived figures computed from a snapshot of the ledger.
//!
//! Everything here is a pure function of the transactions passed in. Sums use `Decimal`, so adding
//! up any number of cent amounts is exact. A sum that leaves the `Decimal` range, which only data
//! written outside of validation can produce, saturates at the range limit.

use crate::model::{Amount, CategoryId, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

fn saturate(positive: bool) -> Decimal {
    warn!("A ledger sum is outside the representable range and has been capped");
    if positive {
        Decimal::MAX
    } else {
        Decimal::MIN
    }
}

fn add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b)
        .unwrap_or_else(|| saturate(b.is_sign_positive()))
}

fn sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b)
        .unwrap_or_else(|| saturate(b.is_sign_negative()))
}

/// Grand totals of the ledger.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
    /// `income - expenses`
    pub balance: Decimal,
}

/// Income and expense sums for one category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub category: CategoryId,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Per-category sums for every known category, in display order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    rows: Vec<CategoryTotals>,
}

impl CategoryBreakdown {
    /// One entry per known category, in `CategoryId::ALL` order.
    pub fn rows(&self) -> &[CategoryTotals] {
        &self.rows
    }

    pub fn get(&self, category: CategoryId) -> &CategoryTotals {
        &self.rows[category.index()]
    }

    /// Sums all categories back into grand totals.
    pub fn totals(&self) -> Totals {
        let income = self.rows.iter().fold(Decimal::ZERO, |acc, r| add(acc, r.income));
        let expenses = self.rows.iter().fold(Decimal::ZERO, |acc, r| add(acc, r.expense));
        Totals {
            income,
            expenses,
            balance: sub(income, expenses),
        }
    }
}

/// The data a category bar chart needs. The three lists are index-aligned with `CategoryId::ALL`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub income_data: Vec<f64>,
    pub expense_data: Vec<f64>,
}

/// Sums income and expenses over `transactions`.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for t in transactions {
        match t.kind() {
            TransactionType::Income => totals.income = add(totals.income, t.amount().value()),
            TransactionType::Expense => {
                totals.expenses = add(totals.expenses, t.amount().value())
            }
        }
    }
    totals.balance = sub(totals.income, totals.expenses);
    totals
}

/// Sums income and expenses per category. Transactions with an unknown category count as `Other`.
pub fn by_category(transactions: &[Transaction]) -> CategoryBreakdown {
    let mut rows: Vec<CategoryTotals> = CategoryId::ALL
        .iter()
        .map(|&category| CategoryTotals {
            category,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        })
        .collect();
    for t in transactions {
        let row = &mut rows[t.category_id().index()];
        match t.kind() {
            TransactionType::Income => row.income = add(row.income, t.amount().value()),
            TransactionType::Expense => row.expense = add(row.expense, t.amount().value()),
        }
    }
    CategoryBreakdown { rows }
}

/// Shapes the per-category sums for a chart.
pub fn chart_data(transactions: &[Transaction]) -> ChartData {
    let breakdown = by_category(transactions);
    let to_f64 = |d: Decimal| Amount::new(d).to_f64();
    ChartData {
        labels: breakdown
            .rows()
            .iter()
            .map(|r| r.category.name().to_string())
            .collect(),
        income_data: breakdown.rows().iter().map(|r| to_f64(r.income)).collect(),
        expense_data: breakdown.rows().iter().map(|r| to_f64(r.expense)).collect(),
    }
}
